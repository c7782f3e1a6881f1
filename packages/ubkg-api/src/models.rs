//! Flat response models
//!
//! Each model is built from one result row. Field order is the
//! serialization order; renamed keys are marked with `serde(rename)`.

use serde::Serialize;
use serde_json::Value;

use crate::graph::mapper::{column_json, column_string, prune_fields};
use crate::graph::{FromRecord, Record};

/// A code that shares a concept with the requested code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodesCodesObj {
    pub concept: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "SAB")]
    pub sab: Option<String>,
}

impl FromRecord for CodesCodesObj {
    fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            concept: column_string(record, "concept")?,
            code: column_string(record, "code")?,
            sab: column_string(record, "sab")?,
        })
    }
}

/// A concept with its preferred term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptDetail {
    pub concept: Option<String>,
    pub prefterm: Option<String>,
}

impl FromRecord for ConceptDetail {
    fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            concept: column_string(record, "concept")?,
            prefterm: column_string(record, "prefterm")?,
        })
    }
}

/// A concept related to the requested one, with the relationship and its source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SabRelationshipConceptPrefterm {
    pub sab: Option<String>,
    pub relationship: Option<String>,
    pub concept: Option<String>,
    pub prefterm: Option<String>,
}

impl FromRecord for SabRelationshipConceptPrefterm {
    fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            sab: column_string(record, "sab")?,
            relationship: column_string(record, "relationship")?,
            concept: column_string(record, "concept")?,
            prefterm: column_string(record, "prefterm")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SabDefinition {
    pub sab: Option<String>,
    pub definition: Option<String>,
}

impl FromRecord for SabDefinition {
    fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            sab: column_string(record, "sab")?,
            definition: column_string(record, "definition")?,
        })
    }
}

/// Term type of the link between a term and a code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermtypeCode {
    pub termtype: Option<String>,
    pub code: Option<String>,
}

impl FromRecord for TermtypeCode {
    fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            termtype: column_string(record, "termtype")?,
            code: column_string(record, "code")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermConcept {
    pub term: Option<String>,
    pub concept: Option<String>,
}

impl FromRecord for TermConcept {
    fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            term: column_string(record, "term")?,
            concept: column_string(record, "concept")?,
        })
    }
}

/// A semantic type with its 1-based position in the full (unpaged) listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticType {
    pub semantic_type: Value,
    pub position: u64,
}

/// One matched concept subgraph, serialized as the node object itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConceptNode {
    pub node: Value,
}

impl FromRecord for ConceptNode {
    /// Null placeholders are pruned from `semantic_types` and `definitions`.
    fn from_record(record: &Record) -> Option<Self> {
        let node = column_json(record, "nodeobject")?;
        if !node.is_object() {
            return None;
        }
        Some(Self {
            node: prune_fields(node, &["semantic_types", "definitions"]),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseServer {
    pub version: String,
    pub edition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeTypeCounts {
    pub total_count: i64,
    pub node_types: Vec<Value>,
}

#[cfg(test)]
mod models_tests {
    use super::*;
    use crate::graph::GraphValue;
    use serde_json::json;

    #[test]
    fn test_codes_codes_obj_renames_sab() {
        let record = Record::new()
            .with("concept", "C0006142")
            .with("code", "SNOMEDCT_US:254837009")
            .with("sab", "SNOMEDCT_US");
        let model = CodesCodesObj::from_record(&record).unwrap();
        assert_eq!(
            serde_json::to_string(&model).unwrap(),
            r#"{"concept":"C0006142","code":"SNOMEDCT_US:254837009","SAB":"SNOMEDCT_US"}"#
        );
    }

    #[test]
    fn test_missing_column_drops_row() {
        let record = Record::new().with("sab", "MSH");
        assert!(SabDefinition::from_record(&record).is_none());
    }

    #[test]
    fn test_null_columns_are_kept() {
        let record = Record::new()
            .with("concept", "C1")
            .with("prefterm", Option::<String>::None);
        let model = ConceptDetail::from_record(&record).unwrap();
        assert_eq!(serde_json::to_value(model).unwrap(), json!({"concept": "C1", "prefterm": null}));
    }

    #[test]
    fn test_concept_node_prunes_placeholders() {
        let nodeobject = GraphValue::Map(vec![
            ("concept".to_string(), "C1".into()),
            (
                "definitions".to_string(),
                GraphValue::List(vec![GraphValue::Map(vec![
                    ("def".to_string(), GraphValue::Null),
                    ("sab".to_string(), GraphValue::Null),
                ])]),
            ),
        ]);
        let record = Record::new().with("nodeobject", nodeobject);
        let model = ConceptNode::from_record(&record).unwrap();
        assert_eq!(model.node, json!({"concept": "C1", "definitions": []}));
    }

    #[test]
    fn test_concept_node_requires_object() {
        let record = Record::new().with("nodeobject", GraphValue::Null);
        assert!(ConceptNode::from_record(&record).is_none());
    }
}
