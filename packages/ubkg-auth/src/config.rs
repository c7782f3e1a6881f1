//! YAML configuration of the auth service

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// UMLS `validate` endpoint, without query string.
    #[serde(alias = "UMLS_VALIDATE_URL")]
    pub umls_validate_url: String,
}

impl AuthConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AuthConfig = serde_yaml::from_str(text)?;
        if config.umls_validate_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "umls_validate_url",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(config)
    }
}
