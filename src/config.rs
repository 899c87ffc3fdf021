use crate::analyzer::comparison::{FilterCriterion, SortCriterion};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where offers are loaded from.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Http {
        base_url: String,
        #[serde(default = "default_timeout_seconds")]
        timeout_seconds: u64,
    },
    Fixture {
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductConfig {
    pub product_id: u64,
    #[serde(default)]
    pub sort: SortCriterion,
    #[serde(default)]
    pub filter: Option<FilterCriterion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub products: Vec<ProductConfig>,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_timeout_seconds() -> u64 {
    10
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

impl AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.products.is_empty() {
            return Err(ConfigError::Invalid("at least one product is required".into()));
        }
        match &self.source {
            SourceConfig::Http { base_url, .. } if base_url.trim().is_empty() => {
                Err(ConfigError::Invalid("source.base_url must not be empty".into()))
            }
            SourceConfig::Http { timeout_seconds: 0, .. } => {
                Err(ConfigError::Invalid("source.timeout_seconds must be positive".into()))
            }
            _ => Ok(()),
        }
    }
}
