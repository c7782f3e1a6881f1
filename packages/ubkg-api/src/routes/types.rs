//! `/node-types`, `/property-types`, `/relationship-types`

use axum::extract::{Path, State};
use axum::response::Response;
use serde_json::json;

use super::{AppState, RequestContext};
use crate::error::{ApiError, Result};
use crate::logic;
use crate::params::ParameterSpec;

const BY_SAB: ParameterSpec = ParameterSpec::new(&["sab"], &["sab"]);

/// Counting every label at once is refused; the message names the timeout
/// and the per-label endpoint to use instead.
fn counts_refused(timeout_ms: u64, endpoint: &str, extra: &str) -> ApiError {
    ApiError::validation(format!(
        "The response to this endpoint is likely to exceed the timeout of {} seconds and so will not be \
         attempted. Execute the {endpoint} endpoint with the name of a node type (e.g., Codes){extra}. \
         To obtain names of node types, execute the node_types endpoint.",
        timeout_ms / 1000
    ))
}

pub(super) async fn node_types(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    ParameterSpec::NONE.validate(&ctx.params)?;
    let node_types = logic::types::node_types(&state.client).await?;
    if node_types.is_empty() {
        return Err(ctx.not_found(&state, "No node types", None));
    }
    state.assembler.respond(&json!({ "node_types": node_types })).await
}

pub(super) async fn all_counts(State(state): State<AppState>) -> Result<Response> {
    Err(counts_refused(
        state.client.timeout_ms(),
        "node_types/(node_type)",
        "",
    ))
}

pub(super) async fn all_counts_by_sab(State(state): State<AppState>) -> Result<Response> {
    Err(counts_refused(
        state.client.timeout_ms(),
        "node_types/counts_by_sab/(node_type)",
        " and SAB",
    ))
}

pub(super) async fn counts(
    State(state): State<AppState>,
    Path(node_type): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    ParameterSpec::NONE.validate(&ctx.params)?;
    let counts = logic::types::node_type_counts(&state.client, &node_type).await?;
    if counts.total_count == 0 {
        return Err(ctx.not_found(&state, "No Node Types", Some(&format!("node_type='{node_type}'"))));
    }
    state.assembler.respond(&counts).await
}

pub(super) async fn counts_by_sab(
    State(state): State<AppState>,
    Path(node_type): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    BY_SAB.validate(&ctx.params)?;
    let sabs = ctx.params.get_list("sab");
    let counts = logic::types::node_type_counts_by_sab(&state.client, &node_type, &sabs).await?;
    if counts.total_count == 0 {
        return Err(ctx.not_found(&state, "No Node Types", Some(&format!("node_type='{node_type}'"))));
    }
    state.assembler.respond(&counts).await
}

pub(super) async fn property_types(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    ParameterSpec::NONE.validate(&ctx.params)?;
    let property_types = logic::types::property_types(&state.client).await?;
    if property_types.is_empty() {
        return Err(ctx.not_found(&state, "No property keys", None));
    }
    state.assembler.respond(&json!({ "property_types": property_types })).await
}

pub(super) async fn relationship_types(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    ParameterSpec::NONE.validate(&ctx.params)?;
    let relationship_types = logic::types::relationship_types(&state.client).await?;
    if relationship_types.is_empty() {
        return Err(ctx.not_found(&state, "No relationship types", None));
    }
    state.assembler.respond(&json!({ "relationship_types": relationship_types })).await
}
