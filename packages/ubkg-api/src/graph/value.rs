//! Engine-neutral result values
//!
//! The database backend converts whatever its driver returns into these types
//! so that mapping and translation never see driver objects.

use serde_json::{Map, Number, Value};

/// A node as returned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeNode {
    /// Legacy numeric id.
    pub id: i64,
    /// Composite element id (`<db>:<table>:<numeric-id>`), when the engine provides one.
    pub element_id: Option<String>,
    pub labels: Vec<String>,
    pub properties: Vec<(String, GraphValue)>,
}

/// A relationship with the ids of both endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeRelationship {
    pub id: i64,
    pub element_id: Option<String>,
    pub start_id: i64,
    pub start_element_id: Option<String>,
    pub end_id: i64,
    pub end_element_id: Option<String>,
    pub rel_type: String,
    pub properties: Vec<(String, GraphValue)>,
}

/// A traversal path.
///
/// `nodes` is in traversal order; `relationships[i]` connects `nodes[i]` and
/// `nodes[i + 1]` in either direction.
#[derive(Debug, Clone, PartialEq)]
pub struct NativePath {
    pub nodes: Vec<NativeNode>,
    pub relationships: Vec<NativeRelationship>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GraphValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<GraphValue>),
    /// Insertion-ordered map.
    Map(Vec<(String, GraphValue)>),
    Node(NativeNode),
    Relationship(NativeRelationship),
    Path(NativePath),
}

impl GraphValue {
    pub fn is_null(&self) -> bool {
        matches!(self, GraphValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GraphValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GraphValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[GraphValue]> {
        match self {
            GraphValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Entry of a map value.
    pub fn get(&self, key: &str) -> Option<&GraphValue> {
        match self {
            GraphValue::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// String or null; anything else is a type mismatch (`None`).
    pub fn as_opt_string(&self) -> Option<Option<String>> {
        match self {
            GraphValue::Null => Some(None),
            GraphValue::String(s) => Some(Some(s.clone())),
            _ => None,
        }
    }

    /// Plain JSON rendering. Graph entities are rendered in the translated
    /// node/relationship/path shapes.
    pub fn to_json(&self) -> Value {
        match self {
            GraphValue::Null => Value::Null,
            GraphValue::Boolean(b) => Value::Bool(*b),
            GraphValue::Integer(i) => Value::Number((*i).into()),
            GraphValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            GraphValue::String(s) => Value::String(s.clone()),
            GraphValue::List(items) => Value::Array(items.iter().map(GraphValue::to_json).collect()),
            GraphValue::Map(entries) => {
                let mut map = Map::new();
                for (k, v) in entries {
                    map.insert(k.clone(), v.to_json());
                }
                Value::Object(map)
            }
            GraphValue::Node(node) => {
                serde_json::to_value(super::translate::translate_node(node)).unwrap_or(Value::Null)
            }
            GraphValue::Relationship(rel) => {
                serde_json::to_value(super::translate::translate_relationship(rel)).unwrap_or(Value::Null)
            }
            GraphValue::Path(path) => match super::translate::translate_path(path) {
                Some(translated) => serde_json::to_value(translated).unwrap_or(Value::Null),
                None => Value::Null,
            },
        }
    }
}

impl From<&str> for GraphValue {
    fn from(value: &str) -> Self {
        GraphValue::String(value.to_string())
    }
}

impl From<String> for GraphValue {
    fn from(value: String) -> Self {
        GraphValue::String(value)
    }
}

impl From<i64> for GraphValue {
    fn from(value: i64) -> Self {
        GraphValue::Integer(value)
    }
}

impl From<bool> for GraphValue {
    fn from(value: bool) -> Self {
        GraphValue::Boolean(value)
    }
}

impl<T: Into<GraphValue>> From<Option<T>> for GraphValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(GraphValue::Null, Into::into)
    }
}

/// One result row: named columns in return order.
///
/// A column the driver did not return is absent, which is different from a
/// column holding null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, GraphValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<GraphValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<GraphValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.fields.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.fields.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&GraphValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
