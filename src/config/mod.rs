// Configuration management module
// Handles TOML configuration, environment overrides and validation

pub mod settings;


pub use settings::{
    Config, ConfigError, EmbeddingProvider, EmbeddingsConfig, LlmConfig, PathsConfig,
};

/// Name of the configuration file looked up in the base directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Load the configuration for the current working directory, after reading `.env`
#[inline]
pub fn load_from_current_dir() -> anyhow::Result<Config> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }
    let base_dir = std::env::current_dir()?;
    Config::load(base_dir)
}
