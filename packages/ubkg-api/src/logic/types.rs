//! Schema listings: node, property and relationship types

use serde_json::Value;

use super::{flatten_lists, query_column};
use crate::client::UbkgClient;
use crate::cypher::{Bindings, Fragment, Quote};
use crate::error::Result;
use crate::models::NodeTypeCounts;

pub async fn node_types(client: &UbkgClient) -> Result<Vec<Value>> {
    let values = query_column(client, "node_types", "node_types", Bindings::new()).await?;
    Ok(flatten_lists(values))
}

pub async fn property_types(client: &UbkgClient) -> Result<Vec<Value>> {
    let values = query_column(client, "property_types", "property_types", Bindings::new()).await?;
    Ok(flatten_lists(values))
}

pub async fn relationship_types(client: &UbkgClient) -> Result<Vec<Value>> {
    let values = query_column(client, "relationship_types", "relationship_types", Bindings::new()).await?;
    Ok(flatten_lists(values))
}

/// Node count for one label.
pub async fn node_type_counts(client: &UbkgClient, node_type: &str) -> Result<NodeTypeCounts> {
    let bindings = Bindings::new().bind("node_type", Fragment::list(&[node_type.to_string()], Quote::Double));
    let outputs = query_column(client, "node_types_counts", "output", bindings).await?;
    Ok(counts(outputs))
}

/// Node count for one label, broken down by the listed SABs.
pub async fn node_type_counts_by_sab(client: &UbkgClient, node_type: &str, sabs: &[String]) -> Result<NodeTypeCounts> {
    let bindings = Bindings::new()
        .bind("node_type", Fragment::list(&[node_type.to_string()], Quote::Double))
        .bind("sab", Fragment::list(sabs, Quote::Double));
    let outputs = query_column(client, "node_types_counts_by_sab", "output", bindings).await?;
    Ok(counts(outputs))
}

/// Gather `output.node_types` from every row and total their `count`s.
fn counts(outputs: Vec<Value>) -> NodeTypeCounts {
    let node_types: Vec<Value> = outputs
        .into_iter()
        .filter_map(|mut output| output.get_mut("node_types").map(Value::take))
        .flat_map(|v| match v {
            Value::Array(items) => items,
            _ => Vec::new(),
        })
        .collect();
    let total_count = node_types
        .iter()
        .filter_map(|t| t.get("count").and_then(Value::as_i64))
        .sum();
    NodeTypeCounts { total_count, node_types }
}
