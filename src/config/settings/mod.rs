
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use super::CONFIG_FILE_NAME;
use crate::embeddings::chunking::ChunkingConfig;

pub const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Locations of documents, generated reports and prompt templates.
/// Relative paths are resolved against the configuration base directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub documents_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub prompts_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("documents"),
            reports_dir: PathBuf::from("reports"),
            prompts_file: PathBuf::from("config/prompts.yaml"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// Model name used to pick the backend, e.g. `gpt-4`, `llama3.1` or `gemini`
    pub model: String,
    pub ollama_base_url: String,
    pub ollama_username: Option<String>,
    pub ollama_password: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_username: None,
            ollama_password: None,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    #[default]
    OpenAi,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingsConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    /// Overrides the provider's default endpoint
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::OpenAi,
            model: "text-embedding-ada-002".to_string(),
            dimension: DEFAULT_EMBEDDING_DIMENSION,
            base_url: None,
            api_key: None,
            timeout_seconds: 30,
            retry_attempts: 3,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid protocol: {0} (must be 'http' or 'https')")]
    InvalidProtocol(String),
    #[error("Invalid model name: {0:?} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid embedding dimension: {0} (must be between 1 and 8192)")]
    InvalidEmbeddingDimension(usize),
    #[error("Invalid max tokens per chunk: {0} (must be greater than 0)")]
    InvalidMaxTokens(usize),
    #[error("Invalid characters per token: {0} (must be greater than 0)")]
    InvalidCharsPerToken(usize),
    #[error("Invalid timeout: {0} (must be greater than 0 seconds)")]
    InvalidTimeout(u64),
    #[error("Invalid retry attempts: {0} (must be at least 1)")]
    InvalidRetryAttempts(u32),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Config {
    /// Load `config.toml` from `config_dir`, applying overrides from the process environment
    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        Self::load_with_env(config_dir, |key| std::env::var(key).ok())
    }

    /// Load `config.toml` from `config_dir`, resolving overrides through `lookup`
    #[inline]
    pub fn load_with_env<P, F>(config_dir: P, lookup: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let config_path = config_dir.as_ref().join(CONFIG_FILE_NAME);

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;
            toml::from_str::<Config>(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            Self::default()
        };
        config.base_dir = config_dir.as_ref().to_path_buf();
        config.apply_env_overrides(lookup);

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    /// Apply the environment variables understood by the tool on top of the file values
    #[inline]
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(model) = get("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = get("OLLAMA_BASE_URL") {
            self.llm.ollama_base_url = url;
        }
        if let Some(user) = get("USER_NAME") {
            self.llm.ollama_username = Some(user);
        }
        if let Some(password) = get("USER_PASSWORD") {
            self.llm.ollama_password = Some(password);
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            if self.embeddings.api_key.is_none() {
                self.embeddings.api_key = Some(key.clone());
            }
            self.llm.openai_api_key = Some(key);
        }
        if let Some(key) = get("GEMINI_API_KEY") {
            self.llm.gemini_api_key = Some(key);
        }
    }

    /// Get the base directory for the application
    #[inline]
    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.llm.validate()?;
        self.embeddings.validate()?;

        if self.chunking.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(self.chunking.max_tokens));
        }
        if self.chunking.chars_per_token == 0 {
            return Err(ConfigError::InvalidCharsPerToken(
                self.chunking.chars_per_token,
            ));
        }

        Ok(())
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.get_base_dir().join(CONFIG_FILE_NAME)
    }

    /// Directory holding the source documents
    #[inline]
    pub fn documents_dir(&self) -> PathBuf {
        self.get_base_dir().join(&self.paths.documents_dir)
    }

    /// Directory receiving reports and the persisted vector index
    #[inline]
    pub fn reports_dir(&self) -> PathBuf {
        self.get_base_dir().join(&self.paths.reports_dir)
    }

    #[inline]
    pub fn prompts_file(&self) -> PathBuf {
        self.get_base_dir().join(&self.paths.prompts_file)
    }
}

impl LlmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        validate_http_url(&self.ollama_base_url)?;
        validate_http_url(&self.openai_base_url)?;
        validate_http_url(&self.gemini_base_url)?;

        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout(self.timeout_seconds));
        }

        Ok(())
    }
}

impl EmbeddingsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if !(1..=8192).contains(&self.dimension) {
            return Err(ConfigError::InvalidEmbeddingDimension(self.dimension));
        }

        if let Some(base_url) = &self.base_url {
            validate_http_url(base_url)?;
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout(self.timeout_seconds));
        }

        if self.retry_attempts == 0 {
            return Err(ConfigError::InvalidRetryAttempts(self.retry_attempts));
        }

        Ok(())
    }

    /// Endpoint root for the configured provider
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| match self.provider {
                EmbeddingProvider::OpenAi => DEFAULT_OPENAI_BASE_URL,
                EmbeddingProvider::Ollama => DEFAULT_OLLAMA_BASE_URL,
            })
    }
}

fn validate_http_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|_| ConfigError::InvalidUrl(value.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidProtocol(url.scheme().to_string()));
    }
    Ok(url)
}
