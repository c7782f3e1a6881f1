//! Response assembly: 404 messages, the payload limit and stashing of
//! oversized bodies

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::error::{seconds_phrase, ApiError, Result};
use crate::params::QueryParams;

#[derive(Error, Debug)]
#[error("Failed to stash response: {0}")]
pub struct StashError(pub String);

/// Somewhere an oversized response body can be written and fetched back
/// from a URL (an S3 bucket with pre-signed URLs in production).
#[async_trait]
pub trait ResponseStash: Send + Sync {
    async fn stash(&self, body: Vec<u8>) -> std::result::Result<String, StashError>;
}

/// Turns mapped results into HTTP responses.
#[derive(Clone)]
pub struct ResponseAssembler {
    /// Largest body served inline; 0 disables the check.
    threshold: u64,
    stash: Option<Arc<dyn ResponseStash>>,
    timeout_ms: u64,
}

impl ResponseAssembler {
    pub fn new(threshold: u64, stash: Option<Arc<dyn ResponseStash>>, timeout_ms: u64) -> Self {
        if threshold == 0 {
            tracing::info!("large_response_threshold is 0; responses are not size-checked");
        }
        Self {
            threshold,
            stash,
            timeout_ms,
        }
    }

    /// 404 for an empty result.
    ///
    /// `target` names what was looked up when the path alone does not say it
    /// clearly, e.g. `concept with identifier 'C0001'`.
    pub fn not_found(&self, prompt: &str, target: Option<&str>, path: &str, params: &QueryParams) -> ApiError {
        let subject = match target {
            Some(target) => format!("{target} at query path '{path}'"),
            None => format!("query path '{path}'"),
        };
        ApiError::NotFound(format!(
            "{prompt} for {subject}{}. Possible reasons include that no data matches the request \
             or that the query exceeded the timeout of {}.",
            params.describe(),
            seconds_phrase(self.timeout_ms)
        ))
    }

    /// Serialize `body` and serve it, unless it is over the threshold.
    ///
    /// Over the threshold the body goes to the stash (303 with its URL) or,
    /// without a stash, the request fails with 403.
    pub async fn respond<T: Serialize>(&self, body: &T) -> Result<Response> {
        let bytes = serde_json::to_vec(body)?;
        let size = bytes.len() as u64;

        if self.threshold > 0 && size > self.threshold {
            let Some(stash) = &self.stash else {
                return Err(ApiError::PayloadTooLarge(format!(
                    "The size of the response to the endpoint with the specified parameters ({size} bytes) \
                     exceeds the payload limit of {} bytes.",
                    self.threshold
                )));
            };
            let url = stash.stash(bytes).await.map_err(|e| {
                tracing::error!(error = %e, size, "stashing large response failed");
                ApiError::Internal("Unexpected error storing large results in S3.".to_string())
            })?;
            tracing::info!(size, threshold = self.threshold, "large response stashed");
            let mut response = (
                StatusCode::SEE_OTHER,
                axum::Json(json!({
                    "message": "The response has been written to a file available at the URL.",
                    "url": url,
                })),
            )
                .into_response();
            if let Ok(location) = HeaderValue::from_str(&url) {
                response.headers_mut().insert(header::LOCATION, location);
            }
            return Ok(response);
        }

        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            bytes,
        )
            .into_response())
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use std::sync::Mutex;

    struct MemoryStash {
        stored: Mutex<Vec<Vec<u8>>>,
    }

    #[async_trait]
    impl ResponseStash for MemoryStash {
        async fn stash(&self, body: Vec<u8>) -> std::result::Result<String, StashError> {
            let mut stored = self.stored.lock().unwrap();
            stored.push(body);
            Ok(format!("https://bucket.example/{}", stored.len()))
        }
    }

    #[test]
    fn test_not_found_message() {
        let assembler = ResponseAssembler::new(0, None, 1000);
        let params = QueryParams::from_pairs([("sab", "HGNC")]);
        let err = assembler.not_found("No Codes", None, "/codes/HGNC:1/codes", &params);
        assert_eq!(
            err.to_string(),
            "No Codes for query path '/codes/HGNC:1/codes' and query parameter 'sab'='HGNC'. \
             Possible reasons include that no data matches the request or that the query exceeded \
             the timeout of 1 second."
        );
    }

    #[tokio::test]
    async fn test_small_body_served_inline() {
        let assembler = ResponseAssembler::new(100, None, 1000);
        let response = assembler.respond(&json!({"sabs": ["HGNC"]})).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_large_body_without_stash_is_forbidden() {
        let assembler = ResponseAssembler::new(5, None, 1000);
        let err = assembler.respond(&json!({"sabs": ["HGNC"]})).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert!(err.to_string().contains("(17 bytes) exceeds the payload limit of 5 bytes"));
    }

    #[tokio::test]
    async fn test_large_body_is_stashed() {
        let stash = Arc::new(MemoryStash {
            stored: Mutex::new(Vec::new()),
        });
        let assembler = ResponseAssembler::new(5, Some(stash.clone()), 1000);
        let response = assembler.respond(&json!({"sabs": ["HGNC"]})).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "https://bucket.example/1");
        assert_eq!(stash.stored.lock().unwrap()[0], br#"{"sabs":["HGNC"]}"#.to_vec());
    }

    #[tokio::test]
    async fn test_zero_threshold_disables_check() {
        let assembler = ResponseAssembler::new(0, None, 1000);
        let body = json!({"codes": vec!["x"; 1000]});
        assert_eq!(assembler.respond(&body).await.unwrap().status(), StatusCode::OK);
    }
}
