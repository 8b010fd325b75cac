// LLM module
// Text generation backends selected once from the configured model name


mod gemini;
mod ollama;
mod openai;

use async_trait::async_trait;
use tracing::info;

use crate::config::LlmConfig;
use crate::http::HttpError;
use crate::{ReportError, Result};

pub use gemini::GeminiGenerator;
pub use ollama::OllamaGenerator;
pub use openai::OpenAiGenerator;

/// Model names served by the Ollama backend
pub const OLLAMA_MODELS: &[&str] = &[
    "deepseek-r1:1.5b",
    "deepseek-r1:14b",
    "llama3.2-vision",
    "dolphin3",
    "llama3",
    "llama3.1",
    "llama3.2",
];

/// Turns a prompt into a text completion
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// The concrete backend chosen for the configured model
#[derive(Debug, Clone)]
pub enum LlmBackend {
    Ollama(OllamaGenerator),
    OpenAi(OpenAiGenerator),
    Gemini(GeminiGenerator),
}

impl LlmBackend {
    /// Select a backend from `config.model` (case-insensitive).
    ///
    /// Known Ollama model names go to Ollama, `gpt-*` and `openai` go to OpenAI,
    /// `gemini` goes to Gemini. Anything else is rejected.
    #[inline]
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let model = config.model.trim().to_lowercase();

        let backend = if OLLAMA_MODELS.contains(&model.as_str()) {
            Self::Ollama(OllamaGenerator::new(config, &model)?)
        } else if model.starts_with("gpt-") || model == "openai" {
            let model = if model == "openai" { "gpt-4" } else { &model };
            Self::OpenAi(OpenAiGenerator::new(config, model)?)
        } else if model == "gemini" {
            Self::Gemini(GeminiGenerator::new(config)?)
        } else {
            return Err(ReportError::Config(format!(
                "Unsupported LLM model: {}",
                config.model
            )));
        };

        info!("Using {} model: {}", backend.provider_name(), backend.model());
        Ok(backend)
    }

    #[inline]
    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::Ollama(_) => "Ollama",
            Self::OpenAi(_) => "OpenAI",
            Self::Gemini(_) => "Google Gemini",
        }
    }

    /// Model identifier sent to the provider
    #[inline]
    pub fn model(&self) -> &str {
        match self {
            Self::Ollama(generator) => generator.model(),
            Self::OpenAi(generator) => generator.model(),
            Self::Gemini(generator) => generator.model(),
        }
    }
}

#[async_trait]
impl TextGenerator for LlmBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self {
            Self::Ollama(generator) => generator.generate(prompt).await,
            Self::OpenAi(generator) => generator.generate(prompt).await,
            Self::Gemini(generator) => generator.generate(prompt).await,
        }
    }
}

fn llm_error(provider: &str, error: &HttpError) -> ReportError {
    ReportError::Llm(format!("{} request failed: {}", provider, error))
}

fn required_key(value: Option<&String>, variable: &str) -> Result<String> {
    value
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ReportError::Config(format!("missing API key (set {})", variable)))
}
