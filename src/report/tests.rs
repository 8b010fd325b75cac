use super::*;
use crate::llm::TextGenerator;
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use tempfile::TempDir;

/// Replays canned responses in order and records the prompts it saw
struct ScriptedLlm {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| (*r).to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> crate::Result<String> {
        self.prompts.lock().expect("lock").push(prompt.to_string());
        self.responses
            .lock()
            .expect("lock")
            .pop_front()
            .ok_or_else(|| ReportError::Llm("no scripted response left".to_string()))
    }
}

fn templates() -> PromptTemplates {
    PromptTemplates {
        detect_type: "DETECT {{text}}".to_string(),
        materials_report: "MATERIALS {{text}}".to_string(),
        supplier_report: "SUPPLIER {{text}}".to_string(),
    }
}

#[tokio::test]
async fn fenced_materials_type_is_detected() {
    let llm = ScriptedLlm::new(&["```json\n{\"type\": \"materials\"}\n```"]);
    let generator = ReportGenerator::new(templates());

    let kind = generator
        .detect_report_type(&llm, "acrylic acid datasheet")
        .await
        .expect("detection should succeed");

    assert_eq!(kind, ReportKind::Materials);
    assert_eq!(
        llm.prompts.lock().expect("lock").as_slice(),
        ["DETECT acrylic acid datasheet".to_string()]
    );
}

#[tokio::test]
async fn any_other_type_is_supplier() {
    let generator = ReportGenerator::new(templates());
    for response in [
        "{\"type\": \"supplier\"}",
        "{\"type\": \"Materials\"}",
        "{\"kind\": \"materials\"}",
        "{\"type\": 1}",
    ] {
        let llm = ScriptedLlm::new(&[response]);
        let kind = generator
            .detect_report_type(&llm, "text")
            .await
            .expect("detection should succeed");
        assert_eq!(kind, ReportKind::Supplier, "{response}");
    }
}

#[tokio::test]
async fn detection_without_json_is_a_parse_error() {
    let llm = ScriptedLlm::new(&["I think it is about materials."]);
    let generator = ReportGenerator::new(templates());

    assert!(matches!(
        generator.detect_report_type(&llm, "text").await,
        Err(ReportError::Parse(_))
    ));
}

#[tokio::test]
async fn generate_builds_supplier_report() {
    let llm = ScriptedLlm::new(&[
        "{\"type\": \"supplier\"}",
        "Sure! {\"executiveSummary\": {\"purpose\": {\"reason\": \"Qualify a second source\", \"products\": [\"acrylic acid\", \"butyl acrylate\"]}}, \"reliability\": {\"performance\": {\"leadTime\": 21}}}",
    ]);
    let generator = ReportGenerator::new(templates());

    let report = generator
        .generate(&llm, "supplier document")
        .await
        .expect("generation should succeed");

    let ReportResult::SupplierReport(supplier) = &report else {
        panic!("expected supplier report, got {report:?}");
    };
    assert_eq!(
        supplier.executive_summary.purpose.reason.as_str(),
        Some("Qualify a second source")
    );
    assert_eq!(
        supplier.executive_summary.purpose.products.as_str(),
        Some("acrylic acid, butyl acrylate")
    );
    assert_eq!(supplier.reliability.performance.lead_time.as_str(), Some("21"));
    assert_eq!(supplier.quality.audits.internal.as_str(), None);

    let prompts = llm.prompts.lock().expect("lock").clone();
    assert_eq!(prompts[1], "SUPPLIER supplier document");
}

#[test]
fn report_result_serializes_with_wrapper_key() {
    let report = ReportResult::MaterialsReport(MaterialsReport::default());
    let value = serde_json::to_value(&report).expect("serialize");

    assert!(value.get("materialsReport").is_some());
    assert_eq!(
        value["materialsReport"]["introduction"]["overview"]["coreFunction"],
        serde_json::Value::Null
    );
}

#[test]
fn schema_tolerates_partial_and_loose_values() {
    let report: MaterialsReport = serde_json::from_value(json!({
        "chemicalProfile": {
            "identity": {"name": "Acrylic acid", "cas": "79-10-7", "molecularWeight": 72.06},
            "properties": {"boilingPoint": null}
        },
        "capacity": {"locations": {"emerging": true}},
        "unexpected": "ignored"
    }))
    .expect("lenient schema");

    assert_eq!(report.chemical_profile.identity.name.as_str(), Some("Acrylic acid"));
    assert_eq!(
        report.chemical_profile.identity.molecular_weight.as_str(),
        Some("72.06")
    );
    assert_eq!(report.chemical_profile.properties.boiling_point.as_str(), None);
    assert_eq!(report.capacity.locations.emerging.as_str(), Some("true"));
    assert_eq!(report.pricing, Default::default());
}

#[test]
fn empty_strings_count_as_missing() {
    assert_eq!(Text::from("").as_str(), None);
    assert_eq!(Text::from("  ").as_str(), None);
    assert_eq!(Text::from("value").as_str(), Some("value"));
}

#[test]
fn html_renders_missing_values_and_escapes() {
    let mut materials = MaterialsReport::default();
    materials.chemical_profile.identity.name = Text::from("Acrylic <acid> & co");
    let report = ReportResult::MaterialsReport(materials);

    let html = render_html("doc1.pdf", &report);

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>CDMO Report - doc1.pdf</title>"));
    assert!(html.contains("<h1>Table of Contents</h1>"));
    assert!(html.contains("<h1>Materials Report</h1>"));
    assert!(html.contains("<h2>1. Introduction</h2>"));
    assert!(html.contains("<h4>5.3.2 Market Analyst Projections</h4>"));
    assert!(html.contains("<p>Name: Acrylic &lt;acid&gt; &amp; co</p>"));
    assert!(html.contains("<p>Core Function: N/A</p>"));
    assert!(!html.contains("<acid>"));
}

#[test]
fn html_title_escapes_file_name() {
    let report = ReportResult::SupplierReport(SupplierReport::default());
    let html = render_html("R&D <draft>.pdf", &report);

    assert!(html.contains("<title>CDMO Report - R&amp;D &lt;draft&gt;.pdf</title>"));
    assert!(html.contains("<p>Reason: N/A</p>"));
}

#[test]
fn html_table_of_contents_nests_subsections() {
    let report = ReportResult::SupplierReport(SupplierReport::default());
    let html = render_html("supplier.pdf", &report);

    let toc_end = html.find("<h1>Supplier Report</h1>").expect("content heading");
    let toc = &html[..toc_end];
    assert!(toc.contains("<li>1. Executive Summary\n    <ul>"));
    assert!(toc.contains("<li>3.2.1 Lab Testing Methods (GC/MS, HPLC, etc.)</li>"));
    assert_eq!(toc.matches("    <ul>").count(), 5);
    assert_eq!(toc.matches("    </ul>").count(), 5);
}

#[test]
fn output_file_names_use_text_before_first_dot() {
    assert_eq!(html_file_name("doc1.pdf"), "doc1.html");
    assert_eq!(html_file_name("supplier.v2.pdf"), "supplier.html");
    assert_eq!(report_stem("README"), "README");
}

#[tokio::test]
async fn save_report_writes_html_and_json() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let reports = temp_dir.path().join("reports");
    let report = ReportResult::SupplierReport(SupplierReport::default());

    let saved = save_report(&reports, "acme.profile.pdf", &report)
        .await
        .expect("save should succeed");

    assert_eq!(saved.html_path, reports.join("acme.html"));
    assert_eq!(saved.json_path, reports.join("acme.json"));

    let json = std::fs::read_to_string(&saved.json_path).expect("read json");
    let decoded: ReportResult = serde_json::from_str(&json).expect("decode report");
    assert_eq!(decoded, report);
    assert!(
        std::fs::read_to_string(&saved.html_path)
            .expect("read html")
            .contains("<h1>Supplier Report</h1>")
    );
}
