use serde_json::Value;
use tracing::{debug, info};

use super::json::{clean_json_response, parse_json_response};
use super::prompts::PromptTemplates;
use super::schema::{ReportKind, ReportResult};
use crate::llm::TextGenerator;
use crate::{ReportError, Result};

/// Drives the model through type detection and schema extraction
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    prompts: PromptTemplates,
}

impl ReportGenerator {
    #[inline]
    pub fn new(prompts: PromptTemplates) -> Self {
        Self { prompts }
    }

    #[inline]
    pub fn prompts(&self) -> &PromptTemplates {
        &self.prompts
    }

    /// Ask the model which report fits `text`.
    /// Anything other than `"type": "materials"` is treated as a supplier document.
    #[inline]
    pub async fn detect_report_type(
        &self,
        llm: &dyn TextGenerator,
        text: &str,
    ) -> Result<ReportKind> {
        let response = llm.generate(&self.prompts.render_detection(text)).await?;
        let payload = clean_json_response(&response)?;
        let parsed: Value = serde_json::from_str(payload)
            .map_err(|e| ReportError::Parse(format!("Invalid type detection JSON: {}", e)))?;

        let kind = if parsed.get("type").and_then(Value::as_str) == Some("materials") {
            ReportKind::Materials
        } else {
            ReportKind::Supplier
        };
        debug!("Detected report type: {}", kind);
        Ok(kind)
    }

    /// Build the report of the given kind from `text`
    #[inline]
    pub async fn build_report(
        &self,
        llm: &dyn TextGenerator,
        kind: ReportKind,
        text: &str,
    ) -> Result<ReportResult> {
        let response = llm.generate(&self.prompts.render(kind, text)).await?;

        let report = match kind {
            ReportKind::Materials => ReportResult::MaterialsReport(parse_json_response(&response)?),
            ReportKind::Supplier => ReportResult::SupplierReport(parse_json_response(&response)?),
        };
        info!("Generated {} report", kind);
        Ok(report)
    }

    /// Detect the report type, then build that report
    #[inline]
    pub async fn generate(&self, llm: &dyn TextGenerator, text: &str) -> Result<ReportResult> {
        let kind = self.detect_report_type(llm, text).await?;
        self.build_report(llm, kind, text).await
    }
}
