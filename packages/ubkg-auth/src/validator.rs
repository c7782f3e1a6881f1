//! UMLS license validation

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::AuthError;

/// Decides whether a UMLS API key belongs to a licensed user.
#[async_trait]
pub trait UmlsValidator: Send + Sync {
    /// `Ok(true)` for a licensed key, `Ok(false)` for a refused one.
    async fn validate(&self, key: &str) -> Result<bool, AuthError>;
}

/// Calls the UMLS `validate` endpoint over HTTP.
///
/// The same key is sent as both the validator key and the key under test,
/// which the service accepts.
pub struct UmlsHttpValidator {
    client: reqwest::Client,
    url: String,
}

impl UmlsHttpValidator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl UmlsValidator for UmlsHttpValidator {
    async fn validate(&self, key: &str) -> Result<bool, AuthError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("validatorApiKey", key), ("apiKey", key)])
            .send()
            .await
            .map_err(|e| AuthError::Upstream(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::info!(%status, "umls validator answered with a non-200 status");
            return Ok(false);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AuthError::Upstream(e.to_string()))?;
        Ok(is_licensed(&body))
    }
}

/// The validator answers with a bare JSON boolean; only `true` is a pass.
fn is_licensed(body: &Value) -> bool {
    body.as_bool() == Some(true)
}
