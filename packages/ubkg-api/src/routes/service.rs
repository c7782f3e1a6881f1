//! Service-level endpoints: greeting, status, database info and sources

use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use super::{AppState, RequestContext};
use crate::error::Result;
use crate::logic;
use crate::logic::database::Status;
use crate::logic::sources::CONTEXTS;
use crate::models::DatabaseServer;
use crate::params::validator::validate_enum;
use crate::params::ParameterSpec;

const SOURCES: ParameterSpec = ParameterSpec::new(&["sab", "context"], &[]);

pub(super) async fn index() -> &'static str {
    "Hello! This is UBKG-API service :)"
}

pub(super) async fn status(State(state): State<AppState>) -> Json<Status> {
    Json(logic::database::status(&state.client, &state.package_base_dir).await)
}

pub(super) async fn database_server(State(state): State<AppState>, ctx: RequestContext) -> Result<Json<DatabaseServer>> {
    ParameterSpec::NONE.validate(&ctx.params)?;
    Ok(Json(logic::database::database_server(&state.client)))
}

pub(super) async fn sources(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    SOURCES.validate(&ctx.params)?;
    let sabs = ctx.params.get_list("sab");
    let contexts = validate_enum("context", &ctx.params.get_list("context"), CONTEXTS, true)?;
    let sources = logic::sources::sources(&state.client, &sabs, &contexts).await?;
    if sources.is_empty() {
        return Err(ctx.not_found(&state, "No sources", None));
    }
    state.assembler.respond(&json!({ "sources": sources })).await
}
