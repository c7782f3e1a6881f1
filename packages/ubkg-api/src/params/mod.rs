//! Query-string parameters and the rules endpoints apply to them
//!
//! - [`QueryParams`]: decoded query string, preserving repeated keys
//! - [`validator`]: per-rule checks producing 400 messages
//! - [`derived`]: validated values built from raw parameters (pagination,
//!   depth ranges, relationship sequences)

pub mod derived;
pub mod validator;

pub use derived::{DepthPolicy, DepthRange, Pagination, RelSequence};
pub use validator::{set_default_maximum, set_default_minimum, ParameterSpec};

/// Decoded query string of one request.
///
/// Pairs are kept in arrival order so that repeated keys (`?sab=A&sab=B`)
/// survive decoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Decode a raw (still percent-encoded) query string.
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        Self { pairs }
    }

    pub fn from_pairs<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }

    /// Distinct parameter names, in first-seen order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (k, _) in &self.pairs {
            if !names.contains(&k.as_str()) {
                names.push(k);
            }
        }
        names
    }

    /// First value supplied for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values for a multi-valued parameter.
    ///
    /// Accepts either repeated keys or a single comma-delimited value:
    /// `?sab=A&sab=B` and `?sab=A,B` both yield `["A", "B"]`.
    pub fn get_list(&self, name: &str) -> Vec<String> {
        let values: Vec<&str> = self
            .pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect();
        match values.as_slice() {
            [single] => single.split(',').map(str::to_string).collect(),
            _ => values.into_iter().map(str::to_string).collect(),
        }
    }

    /// Human-readable rendering used in 404 messages:
    /// ` and query parameters 'sab'='A' ; 'rel'='isa'`.
    pub fn describe(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = self
            .pairs
            .iter()
            .map(|(k, v)| format!("'{k}'='{v}'"))
            .collect();
        let noun = if rendered.len() > 1 {
            "query parameters"
        } else {
            "query parameter"
        };
        format!(" and {noun} {}", rendered.join(" ; "))
    }
}
