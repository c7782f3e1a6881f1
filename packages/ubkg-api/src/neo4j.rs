//! Neo4j backend over the bolt protocol (`neo4rs`)
//!
//! Converts driver values into [`GraphValue`] so nothing past this module
//! sees a driver type. Paths arrive in their packed bolt form (distinct
//! nodes, unbound relationships and an index sequence) and are unpacked here.

use std::sync::Arc;

use async_trait::async_trait;
use neo4rs::{query, BoltType, ConfigBuilder, Graph};

use crate::client::UbkgClient;
use crate::config::AppConfig;
use crate::connection::{ConnectionError, InitGuard};
use crate::cypher::{QueryRequest, TemplateStore};
use crate::executor::{BackendError, CypherBackend};
use crate::graph::{GraphValue, NativeNode, NativePath, NativeRelationship, Record};

static CONNECTION: InitGuard = InitGuard::new();

/// Bolt-backed [`CypherBackend`]. Cloning shares the driver's pool.
#[derive(Clone)]
pub struct Neo4jBackend {
    graph: Graph,
}

impl Neo4jBackend {
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, ConnectionError> {
        let connect_error = |e: neo4rs::Error| ConnectionError::Connect {
            uri: uri.to_string(),
            message: e.to_string(),
        };
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .build()
            .map_err(connect_error)?;
        let graph = Graph::connect(config).await.map_err(connect_error)?;
        Ok(Self { graph })
    }
}

#[async_trait]
impl CypherBackend for Neo4jBackend {
    async fn run(&self, request: &QueryRequest) -> Result<Vec<Record>, BackendError> {
        let mut stream = self
            .graph
            .execute(query(&request.text))
            .await
            .map_err(backend_error)?;

        let mut records = Vec::new();
        while let Some(row) = stream.next().await.map_err(backend_error)? {
            let mut record = Record::new();
            for column in request.columns {
                // A column the query did not return stays absent.
                if let Ok(value) = row.get::<BoltType>(column) {
                    record.insert(*column, from_bolt(&value));
                }
            }
            records.push(record);
        }
        Ok(records)
    }
}

/// Process-wide connection bootstrap.
pub struct Neo4jConnection;

impl Neo4jConnection {
    /// Connect, load templates and read the instance description.
    ///
    /// Only the first call in a process may succeed; later calls fail with
    /// [`ConnectionError::AlreadyInitialized`]. A failed first call gives
    /// the claim back.
    pub async fn create(config: &AppConfig) -> Result<UbkgClient, ConnectionError> {
        CONNECTION.claim()?;
        match Self::build(config).await {
            Ok(client) => Ok(client),
            Err(e) => {
                CONNECTION.release();
                Err(e)
            }
        }
    }

    pub fn is_initialized() -> bool {
        CONNECTION.is_initialized()
    }

    async fn build(config: &AppConfig) -> Result<UbkgClient, ConnectionError> {
        let templates = match &config.templates_dir {
            Some(dir) => TemplateStore::from_dir(dir)
                .map_err(|e| ConnectionError::UnexpectedResult(e.to_string()))?,
            None => TemplateStore::builtin(),
        };
        let backend = Neo4jBackend::connect(&config.server, &config.username, &config.password).await?;
        tracing::info!(uri = %config.server, "bolt driver ready");
        UbkgClient::connect(Arc::new(backend), templates, config.query_timeout_ms()).await
    }
}

fn backend_error(e: neo4rs::Error) -> BackendError {
    let message = e.to_string();
    match status_code(&message) {
        Some(code) => BackendError::with_code(code, message),
        None => BackendError::new(message),
    }
}

/// First `Neo.<Classification>.<Category>.<Title>` status code in a driver message.
fn status_code(message: &str) -> Option<String> {
    message
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '.'))
        .map(|token| token.trim_end_matches('.'))
        .find(|token| token.starts_with("Neo.") && token.matches('.').count() == 3)
        .map(str::to_string)
}

// ============================================================================
// Value conversion
// ============================================================================

pub(crate) fn from_bolt(value: &BoltType) -> GraphValue {
    match value {
        BoltType::Null(_) => GraphValue::Null,
        BoltType::Boolean(b) => GraphValue::Boolean(b.value),
        BoltType::Integer(i) => GraphValue::Integer(i.value),
        BoltType::Float(f) => GraphValue::Float(f.value),
        BoltType::String(s) => GraphValue::String(s.value.clone()),
        BoltType::List(list) => GraphValue::List(list.value.iter().map(from_bolt).collect()),
        BoltType::Map(map) => GraphValue::Map(sorted_entries(&map.value)),
        BoltType::Node(node) => GraphValue::Node(NativeNode {
            id: node.id.value,
            element_id: None,
            labels: node
                .labels
                .value
                .iter()
                .filter_map(|l| match l {
                    BoltType::String(s) => Some(s.value.clone()),
                    _ => None,
                })
                .collect(),
            properties: sorted_entries(&node.properties.value),
        }),
        BoltType::Relation(rel) => GraphValue::Relationship(NativeRelationship {
            id: rel.id.value,
            element_id: None,
            start_id: rel.start_node_id.value,
            start_element_id: None,
            end_id: rel.end_node_id.value,
            end_element_id: None,
            rel_type: rel.typ.value.clone(),
            properties: sorted_entries(&rel.properties.value),
        }),
        BoltType::Path(path) => {
            let nodes = path
                .nodes
                .value
                .iter()
                .filter_map(|n| match from_bolt(n) {
                    GraphValue::Node(node) => Some(node),
                    _ => None,
                })
                .collect();
            let rels = path
                .rels
                .value
                .iter()
                .filter_map(|r| match r {
                    BoltType::UnboundedRelation(u) => Some(UnboundRel {
                        id: u.id.value,
                        rel_type: u.typ.value.clone(),
                        properties: sorted_entries(&u.properties.value),
                    }),
                    _ => None,
                })
                .collect();
            let indices: Vec<i64> = path
                .indices
                .value
                .iter()
                .filter_map(|i| match i {
                    BoltType::Integer(i) => Some(i.value),
                    _ => None,
                })
                .collect();
            match unpack_path(nodes, rels, &indices) {
                Some(path) => GraphValue::Path(path),
                None => GraphValue::Null,
            }
        }
        other => GraphValue::String(format!("{other:?}")),
    }
}

fn sorted_entries(map: &std::collections::HashMap<neo4rs::BoltString, BoltType>) -> Vec<(String, GraphValue)> {
    let mut entries: Vec<(String, GraphValue)> = map
        .iter()
        .map(|(k, v)| (k.value.clone(), from_bolt(v)))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

/// Relationship as packed inside a bolt path: no endpoints of its own.
#[derive(Debug, Clone)]
struct UnboundRel {
    id: i64,
    rel_type: String,
    properties: Vec<(String, GraphValue)>,
}

/// Expand a packed path.
///
/// `indices` alternates relationship and node indices. A relationship index
/// is 1-based and signed: positive means the hop runs from the previous node
/// to the next, negative means against it. Node indices are 0-based into
/// `nodes`; the path starts at `nodes[0]`.
fn unpack_path(nodes: Vec<NativeNode>, rels: Vec<UnboundRel>, indices: &[i64]) -> Option<NativePath> {
    if indices.len() % 2 != 0 {
        return None;
    }
    let mut current = nodes.first()?.clone();
    let mut path_nodes = vec![current.clone()];
    let mut path_rels = Vec::with_capacity(indices.len() / 2);

    for pair in indices.chunks(2) {
        let (rel_index, node_index) = (pair[0], pair[1]);
        let rel = rels.get(usize::try_from(rel_index.unsigned_abs()).ok()?.checked_sub(1)?)?;
        let next = nodes.get(usize::try_from(node_index).ok()?)?.clone();
        let (start, end) = if rel_index > 0 { (&current, &next) } else { (&next, &current) };
        path_rels.push(NativeRelationship {
            id: rel.id,
            element_id: None,
            start_id: start.id,
            start_element_id: None,
            end_id: end.id,
            end_element_id: None,
            rel_type: rel.rel_type.clone(),
            properties: rel.properties.clone(),
        });
        path_nodes.push(next.clone());
        current = next;
    }

    Some(NativePath {
        nodes: path_nodes,
        relationships: path_rels,
    })
}
