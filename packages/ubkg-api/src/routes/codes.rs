//! `/codes/{code_id}/...`

use axum::extract::{Path, State};
use axum::response::Response;

use super::{AppState, RequestContext};
use crate::error::Result;
use crate::logic;
use crate::params::ParameterSpec;

const CODES: ParameterSpec = ParameterSpec::new(&["sab"], &[]);
const TERMS: ParameterSpec = ParameterSpec::new(&["term_type"], &[]);

pub(super) async fn codes(
    State(state): State<AppState>,
    Path(code_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    CODES.validate(&ctx.params)?;
    let sabs = ctx.params.get_list("sab");
    let codes = logic::codes::code_codes(&state.client, &code_id, &sabs).await?;
    if codes.is_empty() {
        return Err(ctx.not_found(
            &state,
            "No Codes sharing the Concept linked to the Code specified",
            Some(&format!("CodeID = {code_id}")),
        ));
    }
    state.assembler.respond(&codes).await
}

pub(super) async fn concepts(
    State(state): State<AppState>,
    Path(code_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    ParameterSpec::NONE.validate(&ctx.params)?;
    let concepts = logic::codes::code_concepts(&state.client, &code_id).await?;
    if concepts.is_empty() {
        return Err(ctx.not_found(
            &state,
            "No Concepts linked to the Code specified",
            Some(&format!("CodeID = {code_id}")),
        ));
    }
    state.assembler.respond(&concepts).await
}

pub(super) async fn terms(
    State(state): State<AppState>,
    Path(code_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    TERMS.validate(&ctx.params)?;
    let term_types = ctx.params.get_list("term_type");
    match logic::codes::code_terms(&state.client, &code_id, &term_types).await? {
        Some(terms) => state.assembler.respond(&terms).await,
        None => Err(ctx.not_found(
            &state,
            "No Terms linked to the Code specified",
            Some(&format!("CodeID = {code_id}")),
        )),
    }
}
