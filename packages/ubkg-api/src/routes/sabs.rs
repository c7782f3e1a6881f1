//! `/sabs/...`

use axum::extract::{Path, State};
use axum::response::Response;
use serde_json::json;

use super::{AppState, RequestContext};
use crate::error::{ApiError, Result};
use crate::logic;
use crate::params::{Pagination, ParameterSpec};

const PAGED: ParameterSpec = ParameterSpec::new(&["skip", "limit"], &[]);

/// Per-SAB listings that cannot run across every SAB at once.
fn sab_required(endpoint: &str) -> ApiError {
    ApiError::validation(format!(
        "The response to this endpoint cannot be run for all SABs because of memory limitations. \
         Execute the {endpoint} endpoint with the identifier for a SAB. \
         Execute the /sabs endpoint for a list of all SABs in the UBKG."
    ))
}

pub(super) async fn sabs(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    ParameterSpec::NONE.validate(&ctx.params)?;
    let sabs = logic::sabs::sabs(&state.client).await?;
    if sabs.is_empty() {
        return Err(ctx.not_found(&state, "No sources", None));
    }
    state.assembler.respond(&json!({ "sabs": sabs })).await
}

pub(super) async fn all_code_counts(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    code_counts_for(&state, None, &ctx).await
}

pub(super) async fn code_counts(
    State(state): State<AppState>,
    Path(sab): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    code_counts_for(&state, Some(&sab), &ctx).await
}

async fn code_counts_for(state: &AppState, sab: Option<&str>, ctx: &RequestContext) -> Result<Response> {
    PAGED.validate(&ctx.params)?;
    let page = Pagination::from_params(&ctx.params)?;
    let counts = logic::sabs::code_counts(&state.client, sab, page).await?;
    if counts.is_empty() {
        let target = sab.map(|sab| format!("sab='{sab}'"));
        return Err(ctx.not_found(state, "No sources", target.as_deref()));
    }
    state.assembler.respond(&json!({ "sabs": counts })).await
}

pub(super) async fn all_code_details() -> Result<Response> {
    Err(sab_required("/sabs/(sab)/codes/details"))
}

pub(super) async fn code_details(
    State(state): State<AppState>,
    Path(sab): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    PAGED.validate(&ctx.params)?;
    let page = Pagination::from_params(&ctx.params)?;
    let codes = logic::sabs::code_details(&state.client, &sab, page).await?;
    if codes.is_empty() {
        return Err(ctx.not_found(&state, "No codes", Some(&format!("sab='{sab}'"))));
    }
    state.assembler.respond(&json!({ "codes": codes })).await
}

pub(super) async fn all_term_types() -> Result<Response> {
    Err(sab_required("/sabs/(sab)/term-types"))
}

pub(super) async fn term_types(
    State(state): State<AppState>,
    Path(sab): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    PAGED.validate(&ctx.params)?;
    let page = Pagination::from_params(&ctx.params)?;
    match logic::sabs::term_types(&state.client, &sab, page).await? {
        Some(term_types) => state.assembler.respond(&term_types).await,
        None => Err(ctx.not_found(&state, "No term types", Some(&format!("sab='{sab}'")))),
    }
}
