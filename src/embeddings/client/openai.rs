use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{Embedder, check_dimension, embedding_error};
use crate::config::EmbeddingsConfig;
use crate::http::JsonHttpClient;
use crate::{ReportError, Result};

/// Embeddings client for OpenAI-compatible `/embeddings` endpoints
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    endpoint: String,
    api_key: String,
    model: String,
    dimension: usize,
    http: JsonHttpClient,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    #[inline]
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ReportError::Config(
                    "missing OpenAI API key (set OPENAI_API_KEY or embeddings.api_key)"
                        .to_string(),
                )
            })?;

        Ok(Self {
            endpoint: format!(
                "{}/embeddings",
                config.effective_base_url().trim_end_matches('/')
            ),
            api_key,
            model: config.model.clone(),
            dimension: config.dimension,
            http: JsonHttpClient::new(
                Duration::from_secs(config.timeout_seconds),
                config.retry_attempts,
            ),
        })
    }

    #[inline]
    pub fn with_http_client(mut self, http: JsonHttpClient) -> Self {
        self.http = http;
        self
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating embedding for text (length: {})", text.len());

        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: text.to_string(),
        };
        let headers = vec![("Authorization", format!("Bearer {}", self.api_key.trim()))];

        let response: EmbeddingResponse = self
            .http
            .post_json_async(self.endpoint.clone(), headers, request)
            .await
            .map_err(|e| embedding_error("OpenAI embedding request failed", &e))?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| {
                ReportError::Embedding("OpenAI response contained no embeddings".to_string())
            })?;

        check_dimension(self.dimension, embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
