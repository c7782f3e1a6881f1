//! Result rows and their translation into response shapes
//!
//! - [`value`]: engine-neutral row values (`Record`, `GraphValue`, native
//!   node/relationship/path)
//! - [`translate`]: nodes, relationships and paths into the `ConceptGraph`
//!   JSON shape
//! - [`mapper`]: lenient row mapping and null-placeholder pruning

pub mod mapper;
pub mod translate;
pub mod value;

pub use mapper::{map_graph, map_lenient, map_rows, prune_fields, prune_null_placeholders, FromRecord, Mapped};
pub use translate::{
    identity_from_element_id, translate_graph, translate_node, translate_path, translate_relationship,
    ConceptGraph, GraphNode, GraphPath, GraphRelationship, GraphShapeError, PathSegment,
};
pub use value::{GraphValue, NativeNode, NativePath, NativeRelationship, Record};
