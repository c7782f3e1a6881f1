//! Translation of native graph objects into the response graph shape
//!
//! The shapes mirror what the Neo4j browser shows for a path result:
//!
//! - node: `{identity, labels, properties, elementId}`
//! - relationship: `{identity, elementId, start, startNodeElementId, end,
//!   endNodeElementId, type, properties}`
//! - path: `{start, end, segments: [{start, end, relationship}], length}`
//!
//! `properties` is a list of single-entry objects rather than one merged
//! object, so property order survives and duplicate keys cannot collide.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::value::{GraphValue, NativeNode, NativePath, NativeRelationship};

/// Final numeric component of a composite element id.
///
/// `"4:abc-123:987"` → `Some(987)`. Ids with fewer than three `:`-separated
/// parts, or a non-numeric third part, yield `None`.
pub fn identity_from_element_id(element_id: &str) -> Option<i64> {
    element_id.split(':').nth(2)?.parse().ok()
}

fn resolve_identity(id: i64, element_id: Option<&str>) -> i64 {
    element_id.and_then(identity_from_element_id).unwrap_or(id)
}

/// One `{key: value}` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: Value,
}

impl Serialize for Property {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}

fn translate_properties(properties: &[(String, GraphValue)]) -> Vec<Property> {
    properties
        .iter()
        .map(|(key, value)| Property {
            key: key.clone(),
            value: value.to_json(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub identity: i64,
    pub labels: Vec<String>,
    pub properties: Vec<Property>,
    #[serde(rename = "elementId")]
    pub element_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphRelationship {
    pub identity: i64,
    #[serde(rename = "elementId")]
    pub element_id: String,
    pub start: i64,
    #[serde(rename = "startNodeElementId")]
    pub start_node_element_id: String,
    pub end: i64,
    #[serde(rename = "endNodeElementId")]
    pub end_node_element_id: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSegment {
    pub start: GraphNode,
    pub end: GraphNode,
    pub relationship: GraphRelationship,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphPath {
    pub start: GraphNode,
    pub end: GraphNode,
    pub segments: Vec<PathSegment>,
    /// Hop count.
    pub length: f64,
}

/// Unified response of the path, tree and subgraph endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptGraph {
    pub nodes: Value,
    pub paths: Vec<GraphPath>,
    pub edges: Value,
}

pub fn translate_node(node: &NativeNode) -> GraphNode {
    let identity = resolve_identity(node.id, node.element_id.as_deref());
    GraphNode {
        identity,
        labels: node.labels.clone(),
        properties: translate_properties(&node.properties),
        element_id: identity.to_string(),
    }
}

pub fn translate_relationship(rel: &NativeRelationship) -> GraphRelationship {
    let identity = resolve_identity(rel.id, rel.element_id.as_deref());
    let start = resolve_identity(rel.start_id, rel.start_element_id.as_deref());
    let end = resolve_identity(rel.end_id, rel.end_element_id.as_deref());
    GraphRelationship {
        identity,
        element_id: identity.to_string(),
        start,
        start_node_element_id: start.to_string(),
        end,
        end_node_element_id: end.to_string(),
        rel_type: rel.rel_type.clone(),
        properties: translate_properties(&rel.properties),
    }
}

/// Translate a path. Each segment's `start`/`end` are the relationship's own
/// endpoints, which may run against the traversal direction.
///
/// Returns `None` for a path with no nodes, or whose relationships refer to
/// nodes that are not on the path.
pub fn translate_path(path: &NativePath) -> Option<GraphPath> {
    let first = path.nodes.first()?;
    let last = path.nodes.last()?;

    let mut segments = Vec::with_capacity(path.relationships.len());
    for rel in &path.relationships {
        let start = find_node(&path.nodes, rel.start_id, rel.start_element_id.as_deref())?;
        let end = find_node(&path.nodes, rel.end_id, rel.end_element_id.as_deref())?;
        segments.push(PathSegment {
            start: translate_node(start),
            end: translate_node(end),
            relationship: translate_relationship(rel),
        });
    }

    Some(GraphPath {
        start: translate_node(first),
        end: translate_node(last),
        length: path.relationships.len() as f64,
        segments,
    })
}

fn find_node<'a>(nodes: &'a [NativeNode], id: i64, element_id: Option<&str>) -> Option<&'a NativeNode> {
    nodes.iter().find(|n| match (element_id, n.element_id.as_deref()) {
        (Some(want), Some(have)) => want == have,
        _ => n.id == id,
    })
}

/// Why a `graph` value could not be translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphShapeError {
    NotAMap,
    MissingPaths,
    NotAPath(usize),
    BrokenPath(usize),
}

/// Translate the composite `{nodes, paths, edges}` value of a graph query.
///
/// `nodes` and `edges` are passed through as JSON and default to empty lists.
/// `paths` must be present and hold only path values.
pub fn translate_graph(graph: &GraphValue) -> Result<ConceptGraph, GraphShapeError> {
    if !matches!(graph, GraphValue::Map(_)) {
        return Err(GraphShapeError::NotAMap);
    }

    let passthrough = |key: &str| match graph.get(key) {
        None | Some(GraphValue::Null) => Value::Array(Vec::new()),
        Some(value) => value.to_json(),
    };

    let raw_paths = graph
        .get("paths")
        .and_then(GraphValue::as_list)
        .ok_or(GraphShapeError::MissingPaths)?;

    let mut paths = Vec::with_capacity(raw_paths.len());
    for (i, item) in raw_paths.iter().enumerate() {
        let GraphValue::Path(path) = item else {
            return Err(GraphShapeError::NotAPath(i));
        };
        paths.push(translate_path(path).ok_or(GraphShapeError::BrokenPath(i))?);
    }

    Ok(ConceptGraph {
        nodes: passthrough("nodes"),
        paths,
        edges: passthrough("edges"),
    })
}
