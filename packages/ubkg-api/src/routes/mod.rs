//! HTTP surface
//!
//! Every handler follows the same order: declared parameter names, derived
//! checks (numeric, enum, ranges), the query, then either a 404 for an empty
//! result or the serialized body through [`ResponseAssembler`].

mod codes;
mod concepts;
mod sabs;
mod semantics;
mod service;
mod terms;
mod types;

use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::client::UbkgClient;
use crate::error::ApiError;
use crate::params::QueryParams;
use crate::response::ResponseAssembler;

/// Shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<UbkgClient>,
    pub assembler: ResponseAssembler,
    /// Directory holding the `VERSION` and `BUILD` files.
    pub package_base_dir: PathBuf,
}

impl AppState {
    pub fn new(client: Arc<UbkgClient>, assembler: ResponseAssembler, package_base_dir: PathBuf) -> Self {
        Self {
            client,
            assembler,
            package_base_dir,
        }
    }
}

/// Request path and decoded query string, as used by validation and 404 messages.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub path: String,
    pub params: QueryParams,
}

impl RequestContext {
    fn not_found(&self, state: &AppState, prompt: &str, target: Option<&str>) -> ApiError {
        state.assembler.not_found(prompt, target, &self.path, &self.params)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            path: parts.uri.path().to_string(),
            params: QueryParams::parse(parts.uri.query()),
        })
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .expose_headers([header::LOCATION]);

    Router::new()
        .route("/", get(service::index))
        .route("/status", get(service::status))
        .route("/database/server", get(service::database_server))
        .route("/sources", get(service::sources))
        // codes
        .route("/codes/{code_id}/codes", get(codes::codes))
        .route("/codes/{code_id}/concepts", get(codes::concepts))
        .route("/codes/{code_id}/terms", get(codes::terms))
        // concepts
        .route("/concepts/{concept_id}/codes", get(concepts::codes))
        .route("/concepts/{concept_id}/concepts", get(concepts::concepts))
        .route("/concepts/{concept_id}/definitions", get(concepts::definitions))
        .route("/concepts/{concept_id}/nodeobjects", get(concepts::node_objects))
        .route("/concepts/{concept_id}/paths/expand", get(concepts::expand))
        .route("/concepts/{concept_id}/paths/trees", get(concepts::trees))
        .route(
            "/concepts/{concept_id}/paths/shortestpath/{terminus}",
            get(concepts::shortest_path),
        )
        .route("/concepts/paths/subgraph", get(concepts::subgraph))
        .route("/concepts/paths/subgraph/sequential", get(concepts::sequential))
        .route(
            "/concepts/{concept_id}/paths/subgraph/sequential",
            get(concepts::sequential_from),
        )
        // semantics
        .route("/semantics/semantic-types", get(semantics::all_types))
        .route("/semantics/semantic-types/{type_id}", get(semantics::one_type))
        .route("/semantics/semantic-types/{type_id}/subtypes", get(semantics::subtypes))
        // terms
        .route("/terms/{term_id}/codes", get(terms::codes))
        .route("/terms/{term_id}/concepts", get(terms::concepts))
        // schema
        .route("/node-types", get(types::node_types))
        .route("/node-types/counts", get(types::all_counts))
        .route("/node-types/counts-by-sab", get(types::all_counts_by_sab))
        .route("/node-types/{node_type}/counts", get(types::counts))
        .route("/node-types/{node_type}/counts-by-sab", get(types::counts_by_sab))
        .route("/property-types", get(types::property_types))
        .route("/relationship-types", get(types::relationship_types))
        // sabs
        .route("/sabs", get(sabs::sabs))
        .route("/sabs/codes/counts", get(sabs::all_code_counts))
        .route("/sabs/{sab}/codes/counts", get(sabs::code_counts))
        .route("/sabs/codes/details", get(sabs::all_code_details))
        .route("/sabs/{sab}/codes/details", get(sabs::code_details))
        .route("/sabs/term-types", get(sabs::all_term_types))
        .route("/sabs/{sab}/term-types", get(sabs::term_types))
        .layer(cors)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
