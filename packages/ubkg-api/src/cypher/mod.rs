//! Cypher query templates
//!
//! Query text lives in `.cypher` files next to the crate, compiled in as the
//! built-in set. A deployment can point `templates_dir` at a directory whose
//! files replace built-ins of the same name.
//!
//! Templates contain `$token` placeholders. [`TemplateStore::render`]
//! replaces each token with a bound [`Fragment`] and produces a
//! [`QueryRequest`]. A token without a binding, or a binding that the
//! template never uses, is a construction error: nothing is sent to the
//! database.

pub mod fragment;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use fragment::{Bindings, Fragment, Quote};

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Unknown query template: {0}")]
    UnknownTemplate(String),

    #[error("Unresolved token ${token} in template {template}")]
    UnresolvedToken { template: String, token: String },

    #[error("Token ${token} is bound but not used by template {template}")]
    UnusedBinding { template: String, token: String },

    #[error("Failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TemplateError>;

/// Final query text plus everything the executor needs to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// Name of the template the text was rendered from.
    pub template: &'static str,
    pub text: String,
    /// Result columns read from each row.
    pub columns: &'static [&'static str],
    /// 0 means unbounded.
    pub timeout_ms: u64,
}

/// A loaded, immutable template.
#[derive(Debug, Clone)]
pub struct QueryTemplate {
    name: &'static str,
    text: String,
    columns: &'static [&'static str],
}

impl QueryTemplate {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    /// Tokens referenced by the template, in order of first appearance.
    pub fn tokens(&self) -> Vec<&str> {
        let mut tokens = Vec::new();
        for (start, end) in token_spans(&self.text) {
            let token = &self.text[start + 1..end];
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        tokens
    }

    /// Substitute every `$token` with its bound fragment.
    pub fn render(&self, bindings: &Bindings, timeout_ms: u64) -> Result<QueryRequest> {
        let mut out = String::with_capacity(self.text.len() + 64);
        let mut used: Vec<&str> = Vec::new();
        let mut cursor = 0;

        for (start, end) in token_spans(&self.text) {
            let token = &self.text[start + 1..end];
            let fragment = bindings.get(token).ok_or_else(|| TemplateError::UnresolvedToken {
                template: self.name.to_string(),
                token: token.to_string(),
            })?;
            out.push_str(&self.text[cursor..start]);
            out.push_str(fragment.as_str());
            used.push(token);
            cursor = end;
        }
        out.push_str(&self.text[cursor..]);

        if let Some(unused) = bindings.tokens().find(|t| !used.contains(t)) {
            return Err(TemplateError::UnusedBinding {
                template: self.name.to_string(),
                token: unused.to_string(),
            });
        }

        Ok(QueryRequest {
            template: self.name,
            text: out,
            columns: self.columns,
            timeout_ms,
        })
    }
}

/// Byte spans `[start, end)` of each `$identifier`, `start` at the `$`.
fn token_spans(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && i + 1 < bytes.len() && is_ident_start(bytes[i + 1]) {
            let start = i;
            i += 1;
            while i < bytes.len() && is_ident_continue(bytes[i]) {
                i += 1;
            }
            spans.push((start, i));
        } else {
            i += 1;
        }
    }
    spans
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

// ============================================================================
// Built-in templates
// ============================================================================

struct Builtin {
    name: &'static str,
    text: &'static str,
    columns: &'static [&'static str],
}

macro_rules! builtin {
    ($name:literal, [$($col:literal),* $(,)?]) => {
        Builtin {
            name: $name,
            text: include_str!(concat!("../../cypher/", $name, ".cypher")),
            columns: &[$($col),*],
        }
    };
}

const BUILTINS: &[Builtin] = &[
    builtin!("codes_code_id_codes", ["concept", "code", "sab"]),
    builtin!("codes_code_id_concepts", ["concept", "prefterm"]),
    builtin!("codes_code_id_terms", ["response"]),
    builtin!("concepts_concept_id_codes", ["code"]),
    builtin!("concepts_concept_id_concepts", ["sab", "relationship", "concept", "prefterm"]),
    builtin!("concepts_concept_id_definitions", ["sab", "definition"]),
    builtin!("concepts_expand", ["graph"]),
    builtin!("concepts_shortestpath", ["graph"]),
    builtin!("concepts_spanning_tree", ["graph"]),
    builtin!("concepts_subgraph", ["graph"]),
    builtin!("concepts_subgraph_sequential", ["graph"]),
    builtin!("concepts_nodes", ["nodeobject"]),
    builtin!("semantics_semantic_types", ["semantic_type"]),
    builtin!("semantics_semantic_subtypes", ["semantic_subtype"]),
    builtin!("terms_term_id_codes", ["termtype", "code"]),
    builtin!("terms_term_id_concepts", ["term", "concept"]),
    builtin!("node_types", ["node_types"]),
    builtin!("node_types_counts", ["output"]),
    builtin!("node_types_counts_by_sab", ["output"]),
    builtin!("property_types", ["property_types"]),
    builtin!("relationship_types", ["relationship_types"]),
    builtin!("sabs", ["sabs"]),
    builtin!("sabs_codes_counts", ["sabs"]),
    builtin!("sabs_codes_details", ["output"]),
    builtin!("sabs_term_types", ["output"]),
    builtin!("sources", ["response"]),
    builtin!("database_components", ["name", "version", "edition"]),
    builtin!("check_connection", ["result"]),
];

/// Read-only set of templates keyed by name.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    templates: HashMap<&'static str, QueryTemplate>,
}

impl TemplateStore {
    /// Templates compiled into the binary.
    pub fn builtin() -> Self {
        let templates = BUILTINS
            .iter()
            .map(|b| {
                (
                    b.name,
                    QueryTemplate {
                        name: b.name,
                        text: b.text.to_string(),
                        columns: b.columns,
                    },
                )
            })
            .collect();
        Self { templates }
    }

    /// Built-ins, with `<dir>/<name>.cypher` replacing any built-in of the
    /// same name. Files with other names are ignored.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::builtin();
        let mut overridden = 0usize;
        for builtin in BUILTINS {
            let path = dir.join(format!("{}.cypher", builtin.name));
            if !path.is_file() {
                continue;
            }
            let text = std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
                path: path.clone(),
                source,
            })?;
            store.templates.insert(
                builtin.name,
                QueryTemplate {
                    name: builtin.name,
                    text,
                    columns: builtin.columns,
                },
            );
            overridden += 1;
        }
        tracing::info!(dir = %dir.display(), overridden, "loaded query templates");
        Ok(store)
    }

    pub fn get(&self, name: &str) -> Result<&QueryTemplate> {
        self.templates
            .get(name)
            .ok_or_else(|| TemplateError::UnknownTemplate(name.to_string()))
    }

    pub fn render(&self, name: &str, bindings: &Bindings, timeout_ms: u64) -> Result<QueryRequest> {
        self.get(name)?.render(bindings, timeout_ms)
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.templates.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
