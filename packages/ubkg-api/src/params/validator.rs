//! Parameter validation rules
//!
//! Each check either passes or returns an [`ApiError::Validation`] carrying
//! the 400 message. Endpoints call them in a fixed order and stop at the
//! first failure; violations are never aggregated.

use std::sync::OnceLock;

use regex_lite::Regex;

use super::QueryParams;
use crate::error::{ApiError, Result};

const DOCS_HINT: &str = "Refer to the SmartAPI documentation for this endpoint for more information.";

/// Allowed and required parameter names of one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    pub allowed: &'static [&'static str],
    pub required: &'static [&'static str],
}

impl ParameterSpec {
    /// Endpoint that takes no query parameters at all.
    pub const NONE: ParameterSpec = ParameterSpec {
        allowed: &[],
        required: &[],
    };

    pub const fn new(allowed: &'static [&'static str], required: &'static [&'static str]) -> Self {
        Self { allowed, required }
    }

    /// Unknown-name check followed by the required-name check.
    pub fn validate(&self, params: &QueryParams) -> Result<()> {
        validate_names(params, self.allowed)?;
        validate_required(params, self.required)
    }
}

/// `" is"` for zero or one item, `"s are"` otherwise.
fn number_agreement(len: usize) -> &'static str {
    if len < 2 {
        " is"
    } else {
        "s are"
    }
}

/// `['a', 'b']` → `'a'; 'b'`
fn quoted_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("'{item}'"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Every parameter present must be in `allowed`.
pub fn validate_names(params: &QueryParams, allowed: &[&str]) -> Result<()> {
    if allowed.is_empty() {
        if params.is_empty() {
            return Ok(());
        }
        return Err(ApiError::validation(format!(
            "Invalid query parameter. This endpoint does not take query parameters. {DOCS_HINT}"
        )));
    }
    for name in params.names() {
        if !allowed.contains(&name) {
            return Err(ApiError::validation(format!(
                "Invalid query parameter: '{name}'. The possible parameter name{}: {}. {DOCS_HINT}",
                number_agreement(allowed.len()),
                quoted_list(allowed)
            )));
        }
    }
    Ok(())
}

/// Every name in `required` must be present.
pub fn validate_required(params: &QueryParams, required: &[&str]) -> Result<()> {
    for name in required {
        if !params.contains(name) {
            return Err(ApiError::validation(format!(
                "Missing query parameter: '{name}'. The required parameter{}: {}. {DOCS_HINT}",
                number_agreement(required.len()),
                quoted_list(required)
            )));
        }
    }
    Ok(())
}

/// Check that every value belongs to `allowed`.
///
/// With `case_insensitive`, values are lower-cased before the comparison and
/// the returned values are the lower-cased forms.
pub fn validate_enum(
    name: &str,
    values: &[String],
    allowed: &[&str],
    case_insensitive: bool,
) -> Result<Vec<String>> {
    let mut normalized = Vec::with_capacity(values.len());
    for value in values {
        let candidate = if case_insensitive {
            value.to_lowercase()
        } else {
            value.clone()
        };
        if !allowed.contains(&candidate.as_str()) {
            return Err(ApiError::validation(format!(
                "Invalid value for parameter: '{name}' ('{value}'). The possible parameter value{}: {}. {DOCS_HINT}",
                number_agreement(allowed.len()),
                quoted_list(allowed)
            )));
        }
        normalized.push(candidate);
    }
    Ok(normalized)
}

fn numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^-?[0-9]+$").expect("numeric pattern is valid"))
}

/// Optional leading `-` followed by digits.
pub fn validate_numeric(name: &str, raw: &str) -> Result<i64> {
    let invalid = || {
        ApiError::validation(format!(
            "Invalid value ({raw}) for parameter '{name}'.  The parameter must be numeric."
        ))
    };
    if !numeric_pattern().is_match(raw) {
        return Err(invalid());
    }
    raw.parse::<i64>().map_err(|_| invalid())
}

/// Numeric and `>= 0`. An absent value passes as `None`.
pub fn validate_nonnegative(name: &str, raw: Option<&str>) -> Result<Option<u64>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value = validate_numeric(name, raw)?;
    if value < 0 {
        return Err(ApiError::validation(format!(
            "Invalid value ({raw}) for parameter '{name}'. The parameter cannot be negative."
        )));
    }
    Ok(Some(value as u64))
}

/// `min_value` must not exceed `max_value`.
pub fn validate_range_order(min_name: &str, min_value: u64, max_name: &str, max_value: u64) -> Result<()> {
    if min_value > max_value {
        return Err(ApiError::validation(format!(
            "Invalid parameter values: '{min_name}' ({min_value}) greater than '{max_name}' ({max_value}). "
        )));
    }
    Ok(())
}

/// The larger of the supplied value and `default`; `default` when absent.
pub fn set_default_minimum(value: Option<u64>, default: u64) -> u64 {
    value.map_or(default, |v| v.max(default))
}

/// The smaller of the supplied value and `default`; `default` when absent.
pub fn set_default_maximum(value: Option<u64>, default: u64) -> u64 {
    value.map_or(default, |v| v.min(default))
}

/// Compare dotted versions component-wise; missing components count as 0.
pub fn version_at_least(instance: &str, required: &str) -> bool {
    fn parts(version: &str) -> Vec<u64> {
        version
            .split(|c: char| c == '.' || c == '-')
            .map_while(|part| part.parse::<u64>().ok())
            .collect()
    }
    let have = parts(instance);
    let want = parts(required);
    let len = have.len().max(want.len());
    for i in 0..len {
        let h = have.get(i).copied().unwrap_or(0);
        let w = want.get(i).copied().unwrap_or(0);
        if h != w {
            return h > w;
        }
    }
    true
}

/// Reject the request when the connected database is older than `required`.
pub fn validate_database_version(instance: &str, required: &str) -> Result<()> {
    if version_at_least(instance, required) {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "This functionality requires at least version {required} of neo4j."
        )))
    }
}
