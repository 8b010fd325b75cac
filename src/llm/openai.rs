use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{TextGenerator, llm_error, required_key};
use crate::config::LlmConfig;
use crate::http::JsonHttpClient;
use crate::{ReportError, Result};

const MAX_TOKENS: u32 = 4096;

/// Chat completions client for OpenAI
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    endpoint: String,
    api_key: String,
    model: String,
    http: JsonHttpClient,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiGenerator {
    #[inline]
    pub fn new(config: &LlmConfig, model: &str) -> Result<Self> {
        Ok(Self {
            endpoint: format!(
                "{}/chat/completions",
                config.openai_base_url.trim_end_matches('/')
            ),
            api_key: required_key(config.openai_api_key.as_ref(), "OPENAI_API_KEY")?,
            model: model.to_string(),
            http: JsonHttpClient::new(Duration::from_secs(config.timeout_seconds), 1),
        })
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            "Sending prompt to OpenAI model {} (length: {})",
            self.model,
            prompt.len()
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            max_tokens: MAX_TOKENS,
        };
        let headers = vec![("Authorization", format!("Bearer {}", self.api_key))];

        let response: ChatResponse = self
            .http
            .post_json_async(self.endpoint.clone(), headers, request)
            .await
            .map_err(|e| llm_error("OpenAI", &e))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ReportError::Llm("OpenAI response contained no message".to_string()))
    }
}
