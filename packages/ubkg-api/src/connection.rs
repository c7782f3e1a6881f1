//! Connection lifecycle: the create-once guard and per-query session tracking

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::executor::BackendError;

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("The database connection has already been initialized")]
    AlreadyInitialized,

    #[error("Failed to connect to {uri}: {message}")]
    Connect { uri: String, message: String },

    #[error("Startup query failed: {0}")]
    Query(#[from] BackendError),

    #[error("Unexpected startup query result: {0}")]
    UnexpectedResult(String),
}

/// Claim-once flag.
///
/// The first [`InitGuard::claim`] succeeds; every later one fails with
/// [`ConnectionError::AlreadyInitialized`]. [`InitGuard::is_initialized`]
/// can be asked any number of times.
#[derive(Debug, Default)]
pub struct InitGuard {
    claimed: AtomicBool,
}

impl InitGuard {
    pub const fn new() -> Self {
        Self {
            claimed: AtomicBool::new(false),
        }
    }

    pub fn claim(&self) -> Result<(), ConnectionError> {
        self.claimed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| ConnectionError::AlreadyInitialized)
    }

    /// Give the claim back after a failed initialization so startup can be retried.
    pub fn release(&self) {
        self.claimed.store(false, Ordering::SeqCst);
    }

    pub fn is_initialized(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }
}

/// Count of query sessions currently open.
#[derive(Debug, Default)]
pub struct SessionTracker {
    open: AtomicUsize,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session. It stays counted until the guard is dropped, whichever
    /// way the query ends.
    pub fn open(self: &Arc<Self>) -> SessionGuard {
        self.open.fetch_add(1, Ordering::SeqCst);
        SessionGuard {
            tracker: Arc::clone(self),
        }
    }

    pub fn open_sessions(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

pub struct SessionGuard {
    tracker: Arc<SessionTracker>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.tracker.open.fetch_sub(1, Ordering::SeqCst);
    }
}
