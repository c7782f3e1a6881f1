//! `/concepts/...`: lookups, path traversals and node objects

use super::{query_column, query_graph, query_models};
use crate::client::UbkgClient;
use crate::cypher::{Bindings, Fragment, Quote};
use crate::error::Result;
use crate::graph::ConceptGraph;
use crate::models::{ConceptNode, SabDefinition, SabRelationshipConceptPrefterm};
use crate::params::{DepthRange, Pagination, RelSequence};

/// Oldest Neo4j release whose Cypher supports `COLLECT {}` subqueries.
pub const SUBGRAPH_MIN_VERSION: &str = "5.11.0";

/// Relationship types and the SABs that may assert them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilter {
    pub sabs: Vec<String>,
    pub rels: Vec<String>,
}

impl PathFilter {
    fn bind(&self, bindings: Bindings) -> Bindings {
        bindings
            .bind("sab", Fragment::list(&self.sabs, Quote::Double))
            .bind("rel", Fragment::list(&self.rels, Quote::Double))
    }
}

/// Ids of the codes of a concept.
pub async fn concept_codes(client: &UbkgClient, concept_id: &str, sabs: &[String]) -> Result<Vec<String>> {
    let bindings = Bindings::new()
        .bind("concept_id", Fragment::literal(concept_id, Quote::Single))
        .bind("sabfilter", Fragment::filter(" AND b.SAB IN", sabs, Quote::Single));
    let codes = query_column(client, "concepts_concept_id_codes", "code", bindings).await?;
    Ok(codes
        .into_iter()
        .filter_map(|c| c.as_str().map(str::to_string))
        .collect())
}

pub async fn concept_concepts(client: &UbkgClient, concept_id: &str) -> Result<Vec<SabRelationshipConceptPrefterm>> {
    let bindings = Bindings::new().bind("concept_id", Fragment::literal(concept_id, Quote::Single));
    query_models(client, "concepts_concept_id_concepts", bindings).await
}

pub async fn concept_definitions(client: &UbkgClient, concept_id: &str) -> Result<Vec<SabDefinition>> {
    let bindings = Bindings::new().bind("concept_id", Fragment::literal(concept_id, Quote::Single));
    query_models(client, "concepts_concept_id_definitions", bindings).await
}

fn traversal_bindings(concept_id: &str, filter: &PathFilter, depth: DepthRange, page: Pagination) -> Bindings {
    let bindings = Bindings::new()
        .bind("query_concept_id", Fragment::literal(concept_id, Quote::Single))
        .bind("mindepth", Fragment::integer(depth.min))
        .bind("maxdepth", Fragment::integer(depth.max))
        .bind("skip", Fragment::integer(page.skip))
        .bind("limit", Fragment::integer(page.limit));
    filter.bind(bindings)
}

/// Paths of `depth.min..=depth.max` hops from a concept.
pub async fn expand(
    client: &UbkgClient,
    concept_id: &str,
    filter: &PathFilter,
    depth: DepthRange,
    page: Pagination,
) -> Result<Option<ConceptGraph>> {
    let bindings = traversal_bindings(concept_id, filter, depth, page);
    query_graph(client, "concepts_expand", bindings).await
}

/// Spanning tree rooted at a concept.
pub async fn trees(
    client: &UbkgClient,
    concept_id: &str,
    filter: &PathFilter,
    depth: DepthRange,
    page: Pagination,
) -> Result<Option<ConceptGraph>> {
    let bindings = traversal_bindings(concept_id, filter, depth, page);
    query_graph(client, "concepts_spanning_tree", bindings).await
}

pub async fn shortest_path(
    client: &UbkgClient,
    origin: &str,
    terminus: &str,
    filter: &PathFilter,
) -> Result<Option<ConceptGraph>> {
    let bindings = filter.bind(
        Bindings::new()
            .bind("origin_concept_id", Fragment::literal(origin, Quote::Single))
            .bind("terminus_concept_id", Fragment::literal(terminus, Quote::Single)),
    );
    query_graph(client, "concepts_shortestpath", bindings).await
}

/// One-hop pairs across the whole graph. The template needs Neo4j
/// [`SUBGRAPH_MIN_VERSION`] or later; callers check that first.
pub async fn subgraph(client: &UbkgClient, filter: &PathFilter, page: Pagination) -> Result<Option<ConceptGraph>> {
    let bindings = filter.bind(
        Bindings::new()
            .bind("skip", Fragment::integer(page.skip))
            .bind("limit", Fragment::integer(page.limit)),
    );
    query_graph(client, "concepts_subgraph", bindings).await
}

/// Paths following `sequence` hop by hop, optionally from a fixed start concept.
pub async fn subgraph_sequential(
    client: &UbkgClient,
    start: Option<&str>,
    sequence: &RelSequence,
    page: Pagination,
) -> Result<Option<ConceptGraph>> {
    let starts: Vec<String> = start.map(str::to_string).into_iter().collect();
    let bindings = Bindings::new()
        .bind("reltypes", Fragment::list(&sequence.types, Quote::Double))
        .bind("relsabs", Fragment::list(&sequence.sabs, Quote::Double))
        .bind("hops", Fragment::integer(sequence.len() as u64))
        .bind("startfilter", Fragment::filter(" AND start.CUI IN", &starts, Quote::Single))
        .bind("skip", Fragment::integer(page.skip))
        .bind("limit", Fragment::integer(page.limit));
    query_graph(client, "concepts_subgraph_sequential", bindings).await
}

/// Concept subgraphs for concepts matching `search` by CUI, code or preferred term.
pub async fn node_objects(client: &UbkgClient, search: &str) -> Result<Vec<ConceptNode>> {
    let bindings = Bindings::new().bind("search", Fragment::list(&[search.to_string()], Quote::Double));
    query_models(client, "concepts_nodes", bindings).await
}
