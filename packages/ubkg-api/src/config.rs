//! Deployment configuration
//!
//! Loaded once at startup from a YAML file. Unknown keys are rejected so a
//! misspelled option fails loudly instead of silently falling back to a
//! default. Upper-case key aliases are accepted for files carried over from
//! older `app.cfg` style deployments.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Query timeout used when the file does not set one (milliseconds).
pub const DEFAULT_TIMEOUT_MS: i64 = 10_000;

/// Default lifetime of a pre-signed URL for a stashed response.
pub const DEFAULT_URL_EXPIRATION_SECS: u64 = 3_600;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Bolt URI of the Neo4j instance, e.g. `bolt://localhost:7687`.
    #[serde(alias = "SERVER")]
    pub server: String,

    #[serde(alias = "USERNAME")]
    pub username: String,

    #[serde(alias = "PASSWORD")]
    pub password: String,

    /// Query timeout in milliseconds. Negative values are treated as 0.
    #[serde(alias = "TIMEOUT", default = "default_timeout")]
    pub timeout: i64,

    /// Largest response body in bytes; 0 disables the check.
    #[serde(alias = "LARGE_RESPONSE_THRESHOLD", default)]
    pub large_response_threshold: u64,

    /// Directory of `.cypher` files overriding the built-in templates.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,

    /// Directory holding the `VERSION` and `BUILD` files reported by `/status`.
    #[serde(default)]
    pub package_base_dir: Option<PathBuf>,

    #[serde(default)]
    pub s3: Option<S3Config>,
}

/// Where oversized responses are written when a stash is configured.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct S3Config {
    #[serde(alias = "AWS_S3_BUCKET_NAME")]
    pub bucket_name: String,

    #[serde(alias = "AWS_ACCESS_KEY_ID")]
    pub access_key_id: String,

    #[serde(alias = "AWS_SECRET_ACCESS_KEY")]
    pub secret_access_key: String,

    #[serde(alias = "AWS_S3_OBJECT_PREFIX", default)]
    pub object_prefix: String,

    #[serde(alias = "AWS_OBJECT_URL_EXPIRATION_IN_SECS", default = "default_url_expiration")]
    pub object_url_expiration_secs: u64,
}

fn default_timeout() -> i64 {
    DEFAULT_TIMEOUT_MS
}

fn default_url_expiration() -> u64 {
    DEFAULT_URL_EXPIRATION_SECS
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(text)?;
        config.check()?;
        if config.timeout < 0 {
            tracing::info!(
                configured = config.timeout,
                "negative query timeout configured; using 0 (no timeout)"
            );
        }
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.server.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "server",
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(s3) = &self.s3 {
            if s3.bucket_name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: "s3.bucket_name",
                    reason: "must not be empty when s3 is configured".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Effective query timeout in milliseconds, clamped to be non-negative.
    pub fn query_timeout_ms(&self) -> u64 {
        self.timeout.max(0) as u64
    }
}
