//! `/semantics/semantic-types[...]`

use super::query_column;
use crate::client::UbkgClient;
use crate::cypher::{Bindings, Fragment, Quote};
use crate::error::Result;
use crate::models::SemanticType;
use crate::params::Pagination;

fn bindings(types: &[String], page: Pagination) -> Bindings {
    Bindings::new()
        .bind("types", Fragment::list(types, Quote::Single))
        .bind("skip", Fragment::integer(page.skip))
        .bind("limit", Fragment::integer(page.limit))
}

fn positioned(values: Vec<serde_json::Value>, page: Pagination) -> Vec<SemanticType> {
    values
        .into_iter()
        .zip(page.first_position()..)
        .map(|(semantic_type, position)| SemanticType { semantic_type, position })
        .collect()
}

/// All semantic types, or the one identified by TUI or name.
pub async fn semantic_types(client: &UbkgClient, type_id: Option<&str>, page: Pagination) -> Result<Vec<SemanticType>> {
    let types: Vec<String> = type_id.map(str::to_string).into_iter().collect();
    let values = query_column(client, "semantics_semantic_types", "semantic_type", bindings(&types, page)).await?;
    Ok(positioned(values, page))
}

/// Descendants of the type identified by TUI or name.
pub async fn semantic_subtypes(client: &UbkgClient, type_id: &str, page: Pagination) -> Result<Vec<SemanticType>> {
    let types = vec![type_id.to_string()];
    let values =
        query_column(client, "semantics_semantic_subtypes", "semantic_subtype", bindings(&types, page)).await?;
    Ok(positioned(values, page))
}
