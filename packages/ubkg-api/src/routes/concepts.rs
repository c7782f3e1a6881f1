//! `/concepts/...`

use axum::extract::{Path, State};
use axum::response::Response;
use serde_json::json;

use super::{AppState, RequestContext};
use crate::error::Result;
use crate::logic;
use crate::logic::concepts::{PathFilter, SUBGRAPH_MIN_VERSION};
use crate::params::validator::validate_database_version;
use crate::params::{DepthPolicy, DepthRange, Pagination, ParameterSpec, RelSequence};

const CODES: ParameterSpec = ParameterSpec::new(&["sab"], &[]);
const TRAVERSAL: ParameterSpec = ParameterSpec::new(
    &["sab", "rel", "mindepth", "maxdepth", "skip", "limit"],
    &["sab", "rel", "maxdepth"],
);
const SHORTEST_PATH: ParameterSpec = ParameterSpec::new(&["sab", "rel"], &["sab", "rel"]);
const SUBGRAPH: ParameterSpec = ParameterSpec::new(&["sab", "rel", "skip", "limit"], &["sab", "rel"]);
const SEQUENTIAL: ParameterSpec = ParameterSpec::new(&["relsequence", "skip", "limit"], &["relsequence"]);

fn path_filter(ctx: &RequestContext) -> PathFilter {
    PathFilter {
        sabs: ctx.params.get_list("sab"),
        rels: ctx.params.get_list("rel"),
    }
}

pub(super) async fn codes(
    State(state): State<AppState>,
    Path(concept_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    CODES.validate(&ctx.params)?;
    let sabs = ctx.params.get_list("sab");
    let codes = logic::concepts::concept_codes(&state.client, &concept_id, &sabs).await?;
    if codes.is_empty() {
        return Err(ctx.not_found(
            &state,
            "No Codes with link to the specified Concept",
            Some(&format!("concept_id = {concept_id}")),
        ));
    }
    state.assembler.respond(&codes).await
}

pub(super) async fn concepts(
    State(state): State<AppState>,
    Path(concept_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    ParameterSpec::NONE.validate(&ctx.params)?;
    let concepts = logic::concepts::concept_concepts(&state.client, &concept_id).await?;
    if concepts.is_empty() {
        return Err(ctx.not_found(
            &state,
            "No Concepts with relationships to the specified Concept",
            Some(&format!("concept_id = {concept_id}")),
        ));
    }
    state.assembler.respond(&concepts).await
}

pub(super) async fn definitions(
    State(state): State<AppState>,
    Path(concept_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    ParameterSpec::NONE.validate(&ctx.params)?;
    let definitions = logic::concepts::concept_definitions(&state.client, &concept_id).await?;
    if definitions.is_empty() {
        return Err(ctx.not_found(
            &state,
            "No Definitions for specified Concept",
            Some(&format!("concept_id='{concept_id}'")),
        ));
    }
    state.assembler.respond(&definitions).await
}

pub(super) async fn expand(
    State(state): State<AppState>,
    Path(concept_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    TRAVERSAL.validate(&ctx.params)?;
    let depth = DepthRange::from_params(&ctx.params, DepthPolicy::EXPAND)?;
    let page = Pagination::from_params(&ctx.params)?;
    let filter = path_filter(&ctx);
    match logic::concepts::expand(&state.client, &concept_id, &filter, depth, page).await? {
        Some(graph) => state.assembler.respond(&graph).await,
        None => Err(ctx.not_found(
            &state,
            "No expanded paths found for specified parameters",
            Some(&format!("query_concept_id='{concept_id}'")),
        )),
    }
}

pub(super) async fn trees(
    State(state): State<AppState>,
    Path(concept_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    TRAVERSAL.validate(&ctx.params)?;
    let depth = DepthRange::from_params(&ctx.params, DepthPolicy::TREES)?;
    let page = Pagination::from_params(&ctx.params)?;
    let filter = path_filter(&ctx);
    match logic::concepts::trees(&state.client, &concept_id, &filter, depth, page).await? {
        Some(graph) => state.assembler.respond(&graph).await,
        None => Err(ctx.not_found(
            &state,
            "No spanning tree found for specified parameters",
            Some(&format!("query_concept_id='{concept_id}'")),
        )),
    }
}

pub(super) async fn shortest_path(
    State(state): State<AppState>,
    Path((origin, terminus)): Path<(String, String)>,
    ctx: RequestContext,
) -> Result<Response> {
    SHORTEST_PATH.validate(&ctx.params)?;
    let filter = path_filter(&ctx);
    match logic::concepts::shortest_path(&state.client, &origin, &terminus, &filter).await? {
        Some(graph) => state.assembler.respond(&graph).await,
        None => Err(ctx.not_found(
            &state,
            "No paths found between Concepts",
            Some(&format!(
                "origin_concept_id='{origin}' and terminus_concept_id='{terminus}'"
            )),
        )),
    }
}

/// The version gate runs before any parameter check.
pub(super) async fn subgraph(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    validate_database_version(&state.client.database().version, SUBGRAPH_MIN_VERSION)?;
    SUBGRAPH.validate(&ctx.params)?;
    let page = Pagination::from_params(&ctx.params)?;
    let filter = path_filter(&ctx);
    match logic::concepts::subgraph(&state.client, &filter, page).await? {
        Some(graph) => state.assembler.respond(&graph).await,
        None => Err(ctx.not_found(
            &state,
            "No subgraphs (pairs of Concepts linked by relationships) found for specified relationship types",
            None,
        )),
    }
}

pub(super) async fn sequential(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    sequential_paths(&state, None, &ctx).await
}

pub(super) async fn sequential_from(
    State(state): State<AppState>,
    Path(concept_id): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    sequential_paths(&state, Some(&concept_id), &ctx).await
}

async fn sequential_paths(state: &AppState, start: Option<&str>, ctx: &RequestContext) -> Result<Response> {
    SEQUENTIAL.validate(&ctx.params)?;
    let page = Pagination::from_params(&ctx.params)?;
    let entries = ctx.params.get_list("relsequence");
    let sequence = RelSequence::parse(&entries)?;

    match logic::concepts::subgraph_sequential(&state.client, start, &sequence, page).await? {
        Some(graph) => state.assembler.respond(&graph).await,
        None => {
            let origin = match start {
                Some(id) => format!("concept with identifier '{id}'"),
                None => "any concept".to_string(),
            };
            let target = format!("{origin} with sequential relationships '{}'", entries.join(","));
            Err(ctx.not_found(state, "No sequential paths found starting", Some(&target)))
        }
    }
}

pub(super) async fn node_objects(
    State(state): State<AppState>,
    Path(search): Path<String>,
    ctx: RequestContext,
) -> Result<Response> {
    ParameterSpec::NONE.validate(&ctx.params)?;
    let nodes = logic::concepts::node_objects(&state.client, &search).await?;
    if nodes.is_empty() {
        return Err(ctx.not_found(
            &state,
            "No nodeobjects for concepts with identifier",
            Some(&format!("identifier='{search}'")),
        ));
    }
    state.assembler.respond(&json!({ "nodeobjects": nodes })).await
}
