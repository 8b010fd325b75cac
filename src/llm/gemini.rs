use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{TextGenerator, llm_error, required_key};
use crate::config::LlmConfig;
use crate::http::JsonHttpClient;
use crate::{ReportError, Result};

const GEMINI_MODEL: &str = "gemini-pro";
const MAX_OUTPUT_TOKENS: u32 = 2048;

/// `generateContent` client for Google Gemini
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    endpoint: String,
    http: JsonHttpClient,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GeminiGenerator {
    #[inline]
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = required_key(config.gemini_api_key.as_ref(), "GEMINI_API_KEY")?;

        let mut endpoint = url::Url::parse(&config.gemini_base_url)
            .and_then(|base| {
                base.join(&format!("/v1beta/models/{}:generateContent", GEMINI_MODEL))
            })
            .map_err(|e| ReportError::Config(format!("Invalid Gemini URL: {}", e)))?;
        endpoint.query_pairs_mut().append_pair("key", &api_key);

        Ok(Self {
            endpoint: endpoint.to_string(),
            http: JsonHttpClient::new(Duration::from_secs(config.timeout_seconds), 1),
        })
    }

    #[inline]
    pub fn model(&self) -> &str {
        GEMINI_MODEL
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Sending prompt to Gemini (length: {})", prompt.len());

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response: GenerateContentResponse = self
            .http
            .post_json_async(self.endpoint.clone(), Vec::new(), request)
            .await
            .map_err(|e| llm_error("Gemini", &e))?;

        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            ReportError::Llm("Gemini response contained no candidates".to_string())
        })?;

        Ok(candidate
            .content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect())
    }
}
