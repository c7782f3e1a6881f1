//! `/terms/{term_id}/...`

use axum::extract::{Path, State};
use axum::response::Response;

use super::{AppState, RequestContext};
use crate::error::Result;
use crate::logic;
use crate::params::ParameterSpec;

pub(super) async fn codes(
    State(state): State<AppState>,
    Path(term_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    ParameterSpec::NONE.validate(&ctx.params)?;
    let codes = logic::terms::term_codes(&state.client, &term_id).await?;
    if codes.is_empty() {
        return Err(ctx.not_found(&state, "No Codes with terms that exactly match the string parameter", None));
    }
    state.assembler.respond(&codes).await
}

pub(super) async fn concepts(
    State(state): State<AppState>,
    Path(term_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    ParameterSpec::NONE.validate(&ctx.params)?;
    let concepts = logic::terms::term_concepts(&state.client, &term_id).await?;
    if concepts.is_empty() {
        return Err(ctx.not_found(
            &state,
            "No Concepts with preferred terms that match the string parameter",
            None,
        ));
    }
    state.assembler.respond(&concepts).await
}
