// PDF text extraction

use std::path::Path;
use tracing::{debug, info};

use crate::{ReportError, Result};

/// Extract the full text of the PDF at `path`.
///
/// Parsing runs on the blocking pool. A parser panic on a malformed file is reported as an
/// extraction error rather than unwinding into the caller.
#[inline]
pub async fn extract_text(path: &Path) -> Result<String> {
    if !tokio::fs::try_exists(path).await? {
        return Err(ReportError::Extraction(format!(
            "PDF file not found: {}",
            path.display()
        )));
    }

    debug!("Extracting text from {}", path.display());
    let owned = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
        .await
        .map_err(|e| {
            ReportError::Extraction(format!(
                "PDF parser aborted on {}: {}",
                path.display(),
                e
            ))
        })?
        .map_err(|e| classify_pdf_error(path, &e.to_string()))?;

    info!(
        "Extracted {} characters from {}",
        text.chars().count(),
        path.display()
    );
    Ok(text)
}

fn classify_pdf_error(path: &Path, message: &str) -> ReportError {
    let lower = message.to_lowercase();
    let reason = if lower.contains("password") || lower.contains("encrypted") {
        "document is encrypted"
    } else if lower.contains("invalid") || lower.contains("malformed") || lower.contains("corrupt")
    {
        "document is corrupted"
    } else {
        "extraction failed"
    };
    ReportError::Extraction(format!("{} ({}): {}", reason, path.display(), message))
}
