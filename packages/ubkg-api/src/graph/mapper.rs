//! Lenient row mapping
//!
//! A row that does not fit the expected shape is dropped, not reported as an
//! error. Dropped rows are counted so callers can log and record them.

use serde_json::Value;

use super::translate::{translate_graph, ConceptGraph};
use super::value::{GraphValue, Record};

/// Conversion of one result row into a flat model.
///
/// `None` means the row is missing an expected column (or holds a value of
/// the wrong type) and is dropped.
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Option<Self>;
}

/// Mapped rows plus the number that were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapped<T> {
    pub items: Vec<T>,
    pub dropped: usize,
}

impl<T> Mapped<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Apply `f` to every record, keeping the `Some` results.
pub fn map_lenient<T, F>(records: &[Record], mut f: F) -> Mapped<T>
where
    F: FnMut(&Record) -> Option<T>,
{
    let mut items = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for record in records {
        match f(record) {
            Some(item) => items.push(item),
            None => dropped += 1,
        }
    }
    Mapped { items, dropped }
}

pub fn map_rows<T: FromRecord>(records: &[Record]) -> Mapped<T> {
    map_lenient(records, T::from_record)
}

/// Required string-or-null column.
pub fn column_string(record: &Record, key: &str) -> Option<Option<String>> {
    record.get(key)?.as_opt_string()
}

/// Required column rendered as JSON.
pub fn column_json(record: &Record, key: &str) -> Option<Value> {
    record.get(key).map(GraphValue::to_json)
}

/// Graph queries return at most one row with a `graph` column. Returns the
/// translated graph of the last well-formed row, if any.
pub fn map_graph(records: &[Record]) -> Mapped<ConceptGraph> {
    map_lenient(records, |record| {
        let graph = record.get("graph")?;
        match translate_graph(graph) {
            Ok(translated) => Some(translated),
            Err(reason) => {
                tracing::debug!(?reason, "graph row dropped");
                None
            }
        }
    })
}

/// Remove objects whose every field is null from a JSON list.
///
/// Outer-join style queries emit `{"def": null, "sab": null}` placeholders
/// for entities with no matches; those are dropped here. Non-object items are
/// kept as they are.
pub fn prune_null_placeholders(items: Vec<Value>) -> Vec<Value> {
    items
        .into_iter()
        .filter(|item| match item {
            Value::Object(map) => !map.values().all(Value::is_null),
            _ => true,
        })
        .collect()
}

/// Apply [`prune_null_placeholders`] to the listed array fields of an object.
pub fn prune_fields(mut object: Value, fields: &[&str]) -> Value {
    if let Value::Object(map) = &mut object {
        for field in fields {
            if let Some(Value::Array(items)) = map.get_mut(*field) {
                let pruned = prune_null_placeholders(std::mem::take(items));
                *items = pruned;
            }
        }
    }
    object
}
