//! Error types for the UBKG API
//!
//! Every failure a request can hit is an [`ApiError`]. The variant decides the
//! HTTP status and whether the body is `{"message": ...}` or `{"error": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::cypher::TemplateError;
use crate::executor::BackendError;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad, missing, out-of-range or unknown query parameter.
    #[error("{0}")]
    Validation(String),

    /// Structurally valid request with no matching rows.
    #[error("{0}")]
    NotFound(String),

    /// Serialized response is over the payload limit and there is nowhere to stash it.
    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("The query runtime exceeded the specified timeout of {}.", timeout_text(.timeout_ms))]
    Timeout { timeout_ms: u64 },

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Query error: {0}")]
    Backend(#[from] BackendError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Stable error code, logged alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::Timeout { .. } => "QUERY_TIMEOUT",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::FORBIDDEN,
            ApiError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(code = self.code(), error = %self, "request failed");
            json!({ "error": self.to_string() })
        } else {
            tracing::debug!(code = self.code(), status = status.as_u16(), "request rejected");
            json!({ "message": self.to_string() })
        };
        (status, Json(body)).into_response()
    }
}

fn timeout_text(timeout_ms: &u64) -> String {
    seconds_phrase(*timeout_ms)
}

/// Renders a millisecond timeout as whole seconds, e.g. "1 second", "30 seconds".
pub fn seconds_phrase(timeout_ms: u64) -> String {
    let seconds = timeout_ms / 1000;
    if seconds == 1 {
        "1 second".to_string()
    } else {
        format!("{seconds} seconds")
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_seconds_phrase_pluralization() {
        assert_eq!(seconds_phrase(1000), "1 second");
        assert_eq!(seconds_phrase(1999), "1 second");
        assert_eq!(seconds_phrase(30_000), "30 seconds");
        assert_eq!(seconds_phrase(0), "0 seconds");
    }

    #[test]
    fn test_timeout_message() {
        let err = ApiError::Timeout { timeout_ms: 10_000 };
        assert_eq!(
            err.to_string(),
            "The query runtime exceeded the specified timeout of 10 seconds."
        );
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.code(), "QUERY_TIMEOUT");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::PayloadTooLarge("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
