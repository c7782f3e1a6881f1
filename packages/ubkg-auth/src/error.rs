//! Auth failures. Every one of them is a 401 with a `{"message": ...}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Must include parameter 'umls-key'")]
    MissingKey,

    #[error("The UMLS API key is not valid")]
    Rejected,

    /// The validator could not be reached or answered with something other
    /// than a boolean.
    #[error("Unable to validate the UMLS API key: {0}")]
    Upstream(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingKey => "MISSING_KEY",
            AuthError::Rejected => "KEY_REJECTED",
            AuthError::Upstream(_) => "UPSTREAM_ERROR",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::Upstream(_) => tracing::warn!(code = self.code(), error = %self, "umls validation failed"),
            _ => tracing::debug!(code = self.code(), "umls key refused"),
        }
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
