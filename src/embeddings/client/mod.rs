#[cfg(test)]
mod tests;

mod ollama;
mod openai;

use async_trait::async_trait;

use crate::config::{EmbeddingProvider, EmbeddingsConfig};
use crate::http::HttpError;
use crate::{ReportError, Result};

pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;

/// Converts text into a fixed-dimension vector via an external embedding service
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector returned by [`Embedder::embed`]
    fn dimension(&self) -> usize;
}

/// Build the embedder selected by the configuration
#[inline]
pub fn build_embedder(config: &EmbeddingsConfig) -> Result<Box<dyn Embedder>> {
    Ok(match config.provider {
        EmbeddingProvider::OpenAi => Box::new(OpenAiEmbedder::new(config)?),
        EmbeddingProvider::Ollama => Box::new(OllamaEmbedder::new(config)?),
    })
}

fn check_dimension(expected: usize, embedding: Vec<f32>) -> Result<Vec<f32>> {
    if embedding.len() == expected {
        Ok(embedding)
    } else {
        Err(ReportError::DimensionMismatch {
            expected,
            actual: embedding.len(),
        })
    }
}

fn embedding_error(context: &str, error: &HttpError) -> ReportError {
    ReportError::Embedding(format!("{}: {}", context, error))
}
