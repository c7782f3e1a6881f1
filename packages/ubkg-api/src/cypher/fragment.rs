//! Typed query fragments
//!
//! A [`Fragment`] is the only thing that can be substituted into a template.
//! Caller-supplied text always ends up inside a quoted string literal with
//! quotes and backslashes escaped; integers come from `u64`. Nothing else can
//! reach the query text.

/// Delimiter used for string literals in the rendered query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    fn as_char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment(String);

impl Fragment {
    /// A single quoted string literal.
    pub fn literal(value: &str, quote: Quote) -> Self {
        Fragment(quote_literal(value, quote))
    }

    /// Comma-delimited quoted literals without brackets: `'A', 'B'`.
    ///
    /// An empty list renders as the empty string, so `[$sab]` becomes `[]`.
    pub fn list(values: &[String], quote: Quote) -> Self {
        Fragment(join_literals(values, quote))
    }

    pub fn integer(value: u64) -> Self {
        Fragment(value.to_string())
    }

    /// Optional `prefix [..]` clause, e.g. ` AND c.SAB IN ['A', 'B']`.
    ///
    /// Renders as the empty string when `values` is empty so the filter is
    /// simply absent from the query.
    pub fn filter(prefix: &'static str, values: &[String], quote: Quote) -> Self {
        if values.is_empty() {
            Fragment(String::new())
        } else {
            Fragment(format!("{prefix} [{}]", join_literals(values, quote)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn join_literals(values: &[String], quote: Quote) -> String {
    values
        .iter()
        .map(|v| quote_literal(v, quote))
        .collect::<Vec<_>>()
        .join(", ")
}

fn quote_literal(value: &str, quote: Quote) -> String {
    let q = quote.as_char();
    let mut out = String::with_capacity(value.len() + 2);
    out.push(q);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out.push(q);
    out
}

/// Token → fragment assignments for one render.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: Vec<(&'static str, Fragment)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `token` (without the leading `$`). Rebinding replaces the value.
    pub fn bind(mut self, token: &'static str, fragment: Fragment) -> Self {
        if let Some(entry) = self.entries.iter_mut().find(|(t, _)| *t == token) {
            entry.1 = fragment;
        } else {
            self.entries.push((token, fragment));
        }
        self
    }

    pub fn get(&self, token: &str) -> Option<&Fragment> {
        self.entries.iter().find(|(t, _)| *t == token).map(|(_, f)| f)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }
}
