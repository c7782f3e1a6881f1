//! `/semantics/semantic-types[/{type_id}[/subtypes]]`

use axum::extract::{Path, State};
use axum::response::Response;
use serde_json::json;

use super::{AppState, RequestContext};
use crate::error::Result;
use crate::logic;
use crate::params::{Pagination, ParameterSpec};

const PAGED: ParameterSpec = ParameterSpec::new(&["skip", "limit"], &[]);

pub(super) async fn all_types(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    semantic_types(&state, None, &ctx).await
}

pub(super) async fn one_type(
    State(state): State<AppState>,
    Path(type_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    semantic_types(&state, Some(&type_id), &ctx).await
}

async fn semantic_types(state: &AppState, type_id: Option<&str>, ctx: &RequestContext) -> Result<Response> {
    PAGED.validate(&ctx.params)?;
    let page = Pagination::from_params(&ctx.params)?;
    let types = logic::semantics::semantic_types(&state.client, type_id, page).await?;
    if types.is_empty() {
        let target = type_id.map(|id| format!("'{id}'"));
        return Err(ctx.not_found(
            state,
            "No Semantic Types match the specified identifier",
            target.as_deref(),
        ));
    }
    state.assembler.respond(&json!({ "semantic_types": types })).await
}

pub(super) async fn subtypes(
    State(state): State<AppState>,
    Path(type_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    PAGED.validate(&ctx.params)?;
    let page = Pagination::from_params(&ctx.params)?;
    let subtypes = logic::semantics::semantic_subtypes(&state.client, &type_id, page).await?;
    if subtypes.is_empty() {
        return Err(ctx.not_found(
            &state,
            "No subtypes of a Semantic Type matching the specified identifier",
            Some(&format!("'{type_id}'")),
        ));
    }
    state.assembler.respond(&json!({ "semantic_sub_types": subtypes })).await
}
