//! UBKG API
//!
//! REST façade over the Unified Biomedical Knowledge Graph held in Neo4j.
//! A request passes through a fixed pipeline:
//!
//! 1. [`params`]: query-string decoding and validation against the
//!    endpoint's declared parameters
//! 2. [`cypher`]: a named template with validated fragments bound into it
//! 3. [`executor`]: timeout-bounded execution on a [`executor::CypherBackend`]
//! 4. [`graph`]: lenient mapping of rows into flat models or a concept graph
//! 5. [`response`]: 404 messages, the payload limit and the JSON body
//!
//! [`routes`] wires the pipeline to HTTP; [`neo4j`] provides the Bolt backend.

pub mod client;
pub mod config;
pub mod connection;
pub mod cypher;
pub mod error;
pub mod executor;
pub mod graph;
pub mod logic;
pub mod metrics;
pub mod models;
pub mod neo4j;
pub mod params;
pub mod response;
pub mod routes;

pub use client::{DatabaseInfo, UbkgClient};
pub use config::AppConfig;
pub use error::{ApiError, Result};
pub use routes::{router, AppState};
