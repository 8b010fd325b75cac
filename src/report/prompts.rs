use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use super::ReportKind;
use crate::{ReportError, Result};

/// Placeholder replaced by the document text
pub const TEXT_PLACEHOLDER: &str = "{{text}}";

/// Prompt templates for type detection and the two report schemas
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplates {
    pub detect_type: String,
    pub materials_report: String,
    pub supplier_report: String,
}

#[derive(Debug, Deserialize)]
struct PromptsFile {
    cdmo_reports: PromptTemplates,
}

impl PromptTemplates {
    /// Parse the `cdmo_reports` section of a prompts YAML document
    #[inline]
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str::<PromptsFile>(content)
            .map(|file| file.cdmo_reports)
            .map_err(|e| ReportError::Config(format!("Invalid prompts file: {}", e)))
    }

    #[inline]
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ReportError::Config(format!(
                "Failed to read prompts file {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!("Loaded prompt templates from {}", path.display());
        Self::from_yaml(&content)
    }

    #[inline]
    pub fn render_detection(&self, text: &str) -> String {
        substitute(&self.detect_type, text)
    }

    #[inline]
    pub fn render(&self, kind: ReportKind, text: &str) -> String {
        match kind {
            ReportKind::Materials => substitute(&self.materials_report, text),
            ReportKind::Supplier => substitute(&self.supplier_report, text),
        }
    }
}

// Only the first placeholder is replaced.
fn substitute(template: &str, text: &str) -> String {
    template.replacen(TEXT_PLACEHOLDER, text, 1)
}
