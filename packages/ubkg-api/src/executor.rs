//! Timeout-bounded query execution
//!
//! [`QueryExecutor`] runs a rendered [`QueryRequest`] through a
//! [`CypherBackend`]. It owns the failure policy:
//!
//! - the engine's transaction-timeout client error becomes [`ApiError::Timeout`]
//! - a query still running when the configured timeout elapses is abandoned
//!   and also becomes [`ApiError::Timeout`]
//! - every other backend error is passed through as [`ApiError::Backend`]
//!
//! Nothing is retried. One session is counted per call and released on every
//! exit path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;

use crate::connection::SessionTracker;
use crate::cypher::QueryRequest;
use crate::error::{ApiError, Result};
use crate::graph::Record;
use crate::metrics::QueryMetrics;

/// Client error code Neo4j reports when a transaction outlives its configured timeout.
pub const TRANSACTION_TIMEOUT_CODE: &str =
    "Neo.ClientError.Transaction.TransactionTimedOutClientConfiguration";

/// Failure reported by a backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    /// Engine status code, e.g. `Neo.ClientError.Statement.SyntaxError`.
    pub code: Option<String>,
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn is_transaction_timeout(&self) -> bool {
        self.code.as_deref() == Some(TRANSACTION_TIMEOUT_CODE)
    }
}

/// Something that can run Cypher text and hand back engine-neutral rows.
///
/// Each row holds the columns listed in [`QueryRequest::columns`] that the
/// engine actually returned.
#[async_trait]
pub trait CypherBackend: Send + Sync {
    async fn run(&self, request: &QueryRequest) -> std::result::Result<Vec<Record>, BackendError>;
}

pub struct QueryExecutor {
    backend: Arc<dyn CypherBackend>,
    sessions: Arc<SessionTracker>,
    metrics: Arc<QueryMetrics>,
}

impl QueryExecutor {
    pub fn new(backend: Arc<dyn CypherBackend>) -> Self {
        Self {
            backend,
            sessions: Arc::new(SessionTracker::new()),
            metrics: Arc::new(QueryMetrics::new()),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionTracker> {
        &self.sessions
    }

    pub fn metrics(&self) -> &Arc<QueryMetrics> {
        &self.metrics
    }

    pub async fn execute(&self, request: &QueryRequest) -> Result<Vec<Record>> {
        let _session = self.sessions.open();
        let start = Instant::now();
        tracing::debug!(template = request.template, timeout_ms = request.timeout_ms, "running query");

        let outcome = if request.timeout_ms == 0 {
            self.backend.run(request).await
        } else {
            let limit = Duration::from_millis(request.timeout_ms);
            match tokio::time::timeout(limit, self.backend.run(request)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(BackendError::with_code(
                    TRANSACTION_TIMEOUT_CODE,
                    "query abandoned after the configured timeout",
                )),
            }
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(records) => {
                self.metrics.record_query(request.template, elapsed_ms);
                if elapsed_ms > 100 {
                    tracing::debug!(template = request.template, elapsed_ms, rows = records.len(), "query done");
                }
                Ok(records)
            }
            Err(err) if err.is_transaction_timeout() => {
                self.metrics.record_timeout();
                tracing::warn!(
                    template = request.template,
                    timeout_ms = request.timeout_ms,
                    elapsed_ms,
                    "query timed out"
                );
                Err(ApiError::Timeout {
                    timeout_ms: request.timeout_ms,
                })
            }
            Err(err) => {
                self.metrics.record_failure();
                tracing::error!(template = request.template, code = ?err.code, error = %err, "query failed");
                Err(ApiError::Backend(err))
            }
        }
    }

    /// Record rows skipped by lenient mapping.
    pub fn note_dropped(&self, template: &str, dropped: usize) {
        if dropped > 0 {
            self.metrics.record_dropped_rows(dropped);
            tracing::warn!(template, dropped, "rows missing expected columns were skipped");
        }
    }
}
