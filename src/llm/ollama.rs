use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{TextGenerator, llm_error};
use crate::config::LlmConfig;
use crate::http::JsonHttpClient;
use crate::{ReportError, Result};

/// Completion client for an Ollama server, optionally behind HTTP basic auth
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    endpoint: String,
    model: String,
    authorization: Option<String>,
    http: JsonHttpClient,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaGenerator {
    #[inline]
    pub fn new(config: &LlmConfig, model: &str) -> Result<Self> {
        let base_url = url::Url::parse(&config.ollama_base_url)
            .map_err(|e| ReportError::Config(format!("Invalid Ollama URL: {}", e)))?;
        let endpoint = base_url
            .join("/api/generate")
            .map_err(|e| ReportError::Config(format!("Failed to build generate URL: {}", e)))?;

        let authorization = match (&config.ollama_username, &config.ollama_password) {
            (None, None) => None,
            (user, password) => {
                let credentials = format!(
                    "{}:{}",
                    user.as_deref().unwrap_or_default(),
                    password.as_deref().unwrap_or_default()
                );
                Some(format!("Basic {}", STANDARD.encode(credentials)))
            }
        };

        Ok(Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            authorization,
            http: JsonHttpClient::new(Duration::from_secs(config.timeout_seconds), 1),
        })
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            "Sending prompt to Ollama model {} (length: {})",
            self.model,
            prompt.len()
        );

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };
        let headers = self
            .authorization
            .iter()
            .map(|value| ("Authorization", value.clone()))
            .collect();

        let response: GenerateResponse = self
            .http
            .post_json_async(self.endpoint.clone(), headers, request)
            .await
            .map_err(|e| llm_error("Ollama", &e))?;

        Ok(response.response)
    }
}
