use html_escape::encode_text;
use std::borrow::Cow;

use super::schema::{MaterialsReport, ReportResult, SupplierReport, Text};

const MISSING: &str = "N/A";

const STYLE: &str = "\
    body { font-family: Arial, sans-serif; margin: 20px; }
    h1 { color: #333; }
    h2 { color: #555; }
    h3 { color: #777; }
    h4 { color: #999; }
    ul { list-style-type: none; padding-left: 20px; }
    p { margin: 5px 0; }";

/// One element of a rendered report, in document order
#[derive(Debug, Clone, Copy)]
enum Block<'a> {
    Title(&'static str),
    Section(&'static str),
    Subsection(&'static str),
    Topic(&'static str),
    /// Labelled paragraph, `<p>Label: value</p>`
    Field(&'static str, &'a Text),
    Body(&'a Text),
}

/// File stem used for report outputs: the name up to its first `.`
#[inline]
pub fn report_stem(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

#[inline]
pub fn html_file_name(file_name: &str) -> String {
    format!("{}.html", report_stem(file_name))
}

/// Render a standalone HTML page with a table of contents followed by the report sections
#[inline]
pub fn render_html(file_name: &str, report: &ReportResult) -> String {
    let blocks = match report {
        ReportResult::MaterialsReport(r) => materials_blocks(r),
        ReportResult::SupplierReport(r) => supplier_blocks(r),
    };

    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n");
    html.push_str("  <title>CDMO Report - ");
    html.push_str(&encode_text(file_name));
    html.push_str("</title>\n  <style>\n");
    html.push_str(STYLE);
    html.push_str("\n  </style>\n</head>\n<body>\n");
    render_toc(&mut html, &blocks);
    render_content(&mut html, &blocks);
    html.push_str("</body>\n</html>\n");
    html
}

fn push_element(html: &mut String, tag: &str, content: &str) {
    html.push('<');
    html.push_str(tag);
    html.push('>');
    html.push_str(content);
    html.push_str("</");
    html.push_str(tag);
    html.push_str(">\n");
}

fn render_toc(html: &mut String, blocks: &[Block<'_>]) {
    html.push_str("<h1>Table of Contents</h1>\n<ul>\n");
    let mut section_open = false;
    for block in blocks {
        match block {
            Block::Section(title) => {
                if section_open {
                    html.push_str("    </ul>\n  </li>\n");
                }
                html.push_str("  <li>");
                html.push_str(&encode_text(title));
                html.push_str("\n    <ul>\n");
                section_open = true;
            }
            Block::Subsection(title) | Block::Topic(title) => {
                html.push_str("      ");
                push_element(html, "li", &encode_text(title));
            }
            _ => {}
        }
    }
    if section_open {
        html.push_str("    </ul>\n  </li>\n");
    }
    html.push_str("</ul>\n");
}

fn render_content(html: &mut String, blocks: &[Block<'_>]) {
    for block in blocks {
        match block {
            Block::Title(title) => push_element(html, "h1", &encode_text(title)),
            Block::Section(title) => push_element(html, "h2", &encode_text(title)),
            Block::Subsection(title) => push_element(html, "h3", &encode_text(title)),
            Block::Topic(title) => push_element(html, "h4", &encode_text(title)),
            Block::Field(label, value) => {
                let line = format!("{}: {}", encode_text(label), display_value(value));
                push_element(html, "p", &line);
            }
            Block::Body(value) => push_element(html, "p", &display_value(value)),
        }
    }
}

fn display_value<'a>(value: &'a Text) -> Cow<'a, str> {
    value
        .as_str()
        .map_or(Cow::Borrowed(MISSING), |text| encode_text(text))
}

fn materials_blocks(r: &MaterialsReport) -> Vec<Block<'_>> {
    use Block::{Body, Field, Section, Subsection, Title, Topic};

    let intro = &r.introduction;
    let profile = &r.chemical_profile;
    let manufacturing = &r.manufacturing;
    let capacity = &r.capacity;
    let pricing = &r.pricing;

    vec![
        Title("Materials Report"),
        Section("1. Introduction"),
        Subsection("1.1 Overview"),
        Field("Core Function", &intro.overview.core_function),
        Field("Commercialization Date", &intro.overview.commercialization_date),
        Topic("1.1.1 Background & Market Context"),
        Body(&intro.overview.background_and_market_context),
        Subsection("1.2 Key Physical and Chemical Properties"),
        Field("Appearance", &intro.properties.appearance),
        Field("Hazards", &intro.properties.hazards),
        Topic("1.2.1 Physical Appearance and Basic Characteristics"),
        Body(&intro.properties.characteristics),
        Topic("1.2.2 Hazardous Nature and Safety Classifications"),
        Body(&intro.properties.safety),
        Subsection("1.3 Market Relevance and Demand Growth"),
        Topic("1.3.1 Major End-Use Industries"),
        Body(&intro.market_relevance.industries),
        Topic("1.3.2 Global and Regional Demand Drivers"),
        Body(&intro.market_relevance.demand_drivers),
        Section("2. Chemical Profile and Specifications"),
        Subsection("2.1 Chemical Identity and CAS Number"),
        Field("Name", &profile.identity.name),
        Field("Formula", &profile.identity.formula),
        Field("CAS", &profile.identity.cas),
        Topic("2.1.1 Synonyms and Chemical Formula"),
        Body(&profile.identity.synonyms),
        Topic("2.1.2 Molecular Weight and Other Identifiers"),
        Body(&profile.identity.molecular_weight),
        Subsection("2.2 Purity Levels and Grades"),
        Field("Grades", &profile.purity.grades),
        Topic("2.2.1 Industrial vs. Pharmaceutical Grades"),
        Body(&profile.purity.grades),
        Topic("2.2.2 Typical Quality Control Metrics"),
        Body(&profile.purity.quality_control),
        Subsection("2.3 Key Properties"),
        Topic("2.3.1 Boiling Point, Stability, Reactivity"),
        Body(&profile.properties.boiling_point),
        Topic("2.3.2 Polymerization Risks and Inhibitor Requirements"),
        Body(&profile.properties.polymerization_risks),
        Section("3. Manufacturing Processes and Technologies"),
        Subsection("3.1 Primary Production Methods"),
        Topic("3.1.1 Reaction Pathways and Catalysts"),
        Body(&manufacturing.methods.pathways),
        Topic("3.1.2 Raw Materials Sourcing"),
        Body(&manufacturing.methods.raw_materials),
        Subsection("3.2 Reaction Chemistry and Conditions"),
        Topic("3.2.1 Temperature, Pressure, and Reaction Times"),
        Body(&manufacturing.chemistry.conditions),
        Topic("3.2.2 Byproducts and Waste Management"),
        Body(&manufacturing.chemistry.byproducts),
        Subsection("3.3 Technical Challenges and Mitigation Strategies"),
        Topic("3.3.1 Equipment Corrosion and Material Selection"),
        Body(&manufacturing.challenges.corrosion),
        Topic("3.3.2 Safety Protocols for Exothermic Reactions"),
        Body(&manufacturing.challenges.safety_protocols),
        Section("4. Capacity Analysis"),
        Subsection("4.1 Global and Regional Capacity Overview"),
        Topic("4.1.1 Major Production Hubs"),
        Body(&capacity.overview.hubs),
        Topic("4.1.2 Capacity Utilization Trends"),
        Body(&capacity.overview.utilization_trends),
        Subsection("4.2 Utilization Rates and Trends"),
        Topic("4.2.1 Seasonal or Cyclical Fluctuations"),
        Body(&capacity.rates.fluctuations),
        Topic("4.2.2 Expansion and Contraction Drivers"),
        Body(&capacity.rates.drivers),
        Subsection("4.3 Key Manufacturing Locations"),
        Topic("4.3.1 North America, Europe, Asia-Pacific"),
        Body(&capacity.locations.regions),
        Topic("4.3.2 Emerging Regions"),
        Body(&capacity.locations.emerging),
        Section("5. Pricing Dynamics"),
        Subsection("5.1 Cost Drivers"),
        Topic("5.1.1 Raw Materials and Feedstocks"),
        Body(&pricing.cost_drivers.raw_materials),
        Topic("5.1.2 Logistics, Regulatory, and Compliance Costs"),
        Body(&pricing.cost_drivers.logistics),
        Subsection("5.2 Pricing Structures (Spot vs. Contract)"),
        Topic("5.2.1 Market Volatility Factors"),
        Body(&pricing.structures.volatility),
        Topic("5.2.2 Contractual Agreements and Terms"),
        Body(&pricing.structures.agreements),
        Subsection("5.3 Historical Pricing Trends and Forecasts"),
        Topic("5.3.1 Price Trajectories"),
        Body(&pricing.trends.trajectories),
        Topic("5.3.2 Market Analyst Projections"),
        Body(&pricing.trends.projections),
    ]
}

fn supplier_blocks(r: &SupplierReport) -> Vec<Block<'_>> {
    use Block::{Body, Field, Section, Subsection, Title, Topic};

    let summary = &r.executive_summary;
    let profiles = &r.supplier_profiles;
    let quality = &r.quality;
    let pricing = &r.pricing;
    let reliability = &r.reliability;

    vec![
        Title("Supplier Report"),
        Section("1. Executive Summary"),
        Subsection("1.1 Purpose and Scope"),
        Field("Reason", &summary.purpose.reason),
        Field("Products", &summary.purpose.products),
        Topic("1.1.1 Overview of Supplier Evaluation"),
        Body(&summary.purpose.evaluation_overview),
        Subsection("1.2 Key Highlights"),
        Field("Differentiators", &summary.highlights.differentiators),
        Field("Findings", &summary.highlights.findings),
        Section("2. Supplier Profiles"),
        Subsection("2.1 Company Background and General Information"),
        Field("History", &profiles.background.history),
        Field("Ownership", &profiles.background.ownership),
        Topic("2.1.1 Founding History and Ownership"),
        Body(&profiles.background.history),
        Topic("2.1.2 Current Leadership and Structure"),
        Body(&profiles.background.leadership),
        Subsection("2.2 Manufacturing Capabilities and Capacities"),
        Field("Facilities", &profiles.capabilities.facilities),
        Field("Volumes", &profiles.capabilities.volumes),
        Topic("2.2.1 Plant Facilities and Technologies"),
        Body(&profiles.capabilities.facilities),
        Topic("2.2.2 Annual Production Volumes and Scalability"),
        Body(&profiles.capabilities.volumes),
        Subsection("2.3 Geographic Presence and Infrastructure"),
        Topic("2.3.1 Distribution Hubs and Logistics Networks"),
        Body(&profiles.geographic.distribution),
        Topic("2.3.2 Regional and International Markets"),
        Body(&profiles.geographic.markets),
        Section("3. Supplier Quality and Certifications"),
        Subsection("3.1 Compliance with Industry Standards"),
        Field("Standards", &quality.compliance.standards),
        Field("Registrations", &quality.compliance.registrations),
        Topic("3.1.1 ISO and GMP Certifications"),
        Body(&quality.compliance.standards),
        Topic("3.1.2 REACH, TSCA, or Other Registrations"),
        Body(&quality.compliance.registrations),
        Subsection("3.2 Quality Assurance and Control Systems"),
        Topic("3.2.1 Lab Testing Methods (GC/MS, HPLC, etc.)"),
        Body(&quality.assurance.testing),
        Topic("3.2.2 Documentation & Traceability"),
        Body(&quality.assurance.traceability),
        Subsection("3.3 Audit History and Certifications"),
        Topic("3.3.1 Internal Audits and Findings"),
        Body(&quality.audits.internal),
        Topic("3.3.2 Customer Audit Outcomes"),
        Body(&quality.audits.customer),
        Section("4. Pricing and Contract Terms"),
        Subsection("4.1 Pricing Structures"),
        Topic("4.1.1 Spot Purchasing vs. Long-Term Contracts"),
        Body(&pricing.structures.spot_vs_contract),
        Topic("4.1.2 Volume Discounts or Rebates"),
        Body(&pricing.structures.discounts),
        Subsection("4.2 Payment Terms and Financial Stability"),
        Topic("4.2.1 Typical Net Payment Days"),
        Body(&pricing.terms.payment_days),
        Topic("4.2.2 Credit Risk Assessments"),
        Body(&pricing.terms.credit_risk),
        Subsection("4.3 Negotiation Levers and Cost Transparency"),
        Topic("4.3.1 Index-Linked Pricing"),
        Body(&pricing.negotiation.index_pricing),
        Topic("4.3.2 Open-Book Policy"),
        Body(&pricing.negotiation.transparency),
        Section("5. Supply Reliability and Risks"),
        Subsection("5.1 Historical Delivery Performance"),
        Topic("5.1.1 On-Time Delivery Metrics"),
        Body(&reliability.performance.delivery_metrics),
        Topic("5.1.2 Lead Time Consistency"),
        Body(&reliability.performance.lead_time),
        Subsection("5.2 Risk Factors"),
        Topic("5.2.1 Operational, Geopolitical, Environmental"),
        Body(&reliability.risks.factors),
        Topic("5.2.2 Force Majeure or Unexpected Disruptions"),
        Body(&reliability.risks.disruptions),
        Subsection("5.3 Contingency Measures and Disaster Recovery Plans"),
        Topic("5.3.1 Backup Power and Redundancy"),
        Body(&reliability.contingency.redundancy),
        Topic("5.3.2 Alternate Shipping Routes"),
        Body(&reliability.contingency.routes),
    ]
}
