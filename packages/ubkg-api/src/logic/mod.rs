//! Query logic per endpoint family
//!
//! Each function binds the tokens of one template from already validated
//! inputs, runs it and maps the rows. Whether an empty result is a 404 is
//! left to the route.

pub mod codes;
pub mod concepts;
pub mod database;
pub mod sabs;
pub mod semantics;
pub mod sources;
pub mod terms;
pub mod types;

use serde_json::Value;

use crate::client::UbkgClient;
use crate::cypher::Bindings;
use crate::error::Result;
use crate::graph::{map_graph, map_rows, ConceptGraph, FromRecord, GraphValue, Record};

/// Run a template and map every row leniently into `T`.
pub(crate) async fn query_models<T: FromRecord>(
    client: &UbkgClient,
    template: &'static str,
    bindings: Bindings,
) -> Result<Vec<T>> {
    let records = client.query(template, bindings).await?;
    let mapped = map_rows::<T>(&records);
    client.executor().note_dropped(template, mapped.dropped);
    Ok(mapped.items)
}

/// Run a graph template. No rows (or no well-formed row) means no graph.
pub(crate) async fn query_graph(
    client: &UbkgClient,
    template: &'static str,
    bindings: Bindings,
) -> Result<Option<ConceptGraph>> {
    let records = client.query(template, bindings).await?;
    let mut mapped = map_graph(&records);
    client.executor().note_dropped(template, mapped.dropped);
    Ok(mapped.items.pop())
}

/// Values of one column across all rows, as JSON. Rows without the column
/// are skipped.
pub(crate) async fn query_column(
    client: &UbkgClient,
    template: &'static str,
    column: &str,
    bindings: Bindings,
) -> Result<Vec<Value>> {
    let records = client.query(template, bindings).await?;
    Ok(column_values(client, template, &records, column))
}

fn column_values(client: &UbkgClient, template: &str, records: &[Record], column: &str) -> Vec<Value> {
    let values: Vec<Value> = records
        .iter()
        .filter_map(|r| r.get(column).map(GraphValue::to_json))
        .collect();
    client.executor().note_dropped(template, records.len() - values.len());
    values
}

/// Flatten a single-row list column (`RETURN COLLECT(..) AS x`) into its items.
pub(crate) fn flatten_lists(values: Vec<Value>) -> Vec<Value> {
    values
        .into_iter()
        .flat_map(|v| match v {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        })
        .collect()
}

/// Number objects by their 1-based position in the unpaged result.
pub(crate) fn with_positions(items: Vec<Value>, first: u64) -> Vec<Value> {
    items
        .into_iter()
        .zip(first..)
        .map(|(mut item, position)| {
            if let Value::Object(map) = &mut item {
                map.insert("position".to_string(), Value::from(position));
            }
            item
        })
        .collect()
}

#[cfg(test)]
mod logic_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_positions_offsets_by_skip() {
        let items = vec![json!({"sab": "A"}), json!({"sab": "B"})];
        assert_eq!(
            with_positions(items, 11),
            vec![json!({"sab": "A", "position": 11}), json!({"sab": "B", "position": 12})]
        );
    }

    #[test]
    fn test_flatten_lists() {
        let values = vec![json!(["a", "b"]), json!(null), json!("c")];
        assert_eq!(flatten_lists(values), vec![json!("a"), json!("b"), json!("c")]);
    }
}
