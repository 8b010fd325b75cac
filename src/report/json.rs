use fancy_regex::Regex;
use std::sync::LazyLock;

use crate::{ReportError, Result};

static JSON_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\s*([\s\S]*?)\s*```").expect("valid regex"));

/// Extract the JSON payload from a model response.
///
/// Prefers the body of a fenced ```` ```json ```` block. Otherwise takes everything from the
/// first `{` to the last `}`.
#[inline]
pub fn clean_json_response(response: &str) -> Result<&str> {
    if let Ok(Some(captures)) = JSON_FENCE_REGEX.captures(response) {
        if let Some(body) = captures.get(1).map(|m| m.as_str().trim()) {
            if !body.is_empty() {
                return Ok(body);
            }
        }
    }

    match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if start <= end => response
            .get(start..=end)
            .map(str::trim)
            .ok_or_else(no_json),
        _ => Err(no_json()),
    }
}

/// Clean `response` and deserialize the payload
#[inline]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(response: &str) -> Result<T> {
    let payload = clean_json_response(response)?;
    serde_json::from_str(payload)
        .map_err(|e| ReportError::Parse(format!("Invalid JSON in model response: {}", e)))
}

fn no_json() -> ReportError {
    ReportError::Parse("No valid JSON found in response".to_string())
}
