// Report module
// Prompting, response parsing, schemas and HTML rendering for CDMO reports

#[cfg(test)]
mod tests;

pub mod generator;
pub mod html;
pub mod json;
pub mod prompts;
pub mod schema;

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::{ReportError, Result};

pub use generator::ReportGenerator;
pub use html::{html_file_name, render_html, report_stem};
pub use json::{clean_json_response, parse_json_response};
pub use prompts::PromptTemplates;
pub use schema::{MaterialsReport, ReportKind, ReportResult, SupplierReport, Text};

/// Paths written by [`save_report`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReport {
    pub html_path: PathBuf,
    pub json_path: PathBuf,
}

/// Write `<stem>.html` and `<stem>.json` for `file_name` into `reports_dir`
#[inline]
pub async fn save_report(
    reports_dir: &Path,
    file_name: &str,
    report: &ReportResult,
) -> Result<SavedReport> {
    fs::create_dir_all(reports_dir).await.map_err(|e| {
        ReportError::Persistence(format!(
            "Failed to create directory {}: {}",
            reports_dir.display(),
            e
        ))
    })?;

    let html_path = reports_dir.join(html_file_name(file_name));
    let json_path = reports_dir.join(format!("{}.json", report_stem(file_name)));

    let json = serde_json::to_string_pretty(report)
        .map_err(|e| ReportError::Persistence(format!("Failed to encode report: {}", e)))?;

    write_file(&html_path, render_html(file_name, report)).await?;
    write_file(&json_path, json).await?;

    info!("Report generated: {}", html_path.display());
    Ok(SavedReport {
        html_path,
        json_path,
    })
}

async fn write_file(path: &Path, contents: String) -> Result<()> {
    fs::write(path, contents).await.map_err(|e| {
        ReportError::Persistence(format!("Failed to write {}: {}", path.display(), e))
    })
}
