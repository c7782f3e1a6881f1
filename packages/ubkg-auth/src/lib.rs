//! UBKG auth
//!
//! Answers reverse-proxy auth subrequests by checking a caller's UMLS API
//! key against the UMLS license validation service.

pub mod config;
pub mod error;
pub mod routes;
pub mod validator;

pub use config::AuthConfig;
pub use error::AuthError;
pub use routes::{router, AuthState};
pub use validator::{UmlsHttpValidator, UmlsValidator};
