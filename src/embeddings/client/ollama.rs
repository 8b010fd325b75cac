use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{Embedder, check_dimension, embedding_error};
use crate::config::EmbeddingsConfig;
use crate::http::JsonHttpClient;
use crate::{ReportError, Result};

/// Embeddings client for a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    endpoint: String,
    model: String,
    dimension: usize,
    http: JsonHttpClient,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    #[inline]
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let base_url = url::Url::parse(config.effective_base_url())
            .map_err(|e| ReportError::Config(format!("Invalid Ollama URL: {}", e)))?;
        let endpoint = base_url
            .join("/api/embed")
            .map_err(|e| ReportError::Config(format!("Failed to build embedding URL: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
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
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating Ollama embedding for text (length: {})", text.len());

        let request = EmbedRequest {
            model: self.model.clone(),
            input: text.to_string(),
        };

        let response: EmbedResponse = self
            .http
            .post_json_async(self.endpoint.clone(), Vec::new(), request)
            .await
            .map_err(|e| embedding_error("Ollama embedding request failed", &e))?;

        let embedding = response.embeddings.into_iter().next().ok_or_else(|| {
            ReportError::Embedding("Ollama response contained no embeddings".to_string())
        })?;

        debug!("Generated embedding with {} dimensions", embedding.len());
        check_dimension(self.dimension, embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
