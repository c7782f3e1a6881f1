//! Values derived from validated parameters

use super::validator::{
    set_default_maximum, set_default_minimum, validate_nonnegative, validate_range_order,
};
use super::QueryParams;
use crate::error::{ApiError, Result};

/// Floor applied to `skip`.
pub const DEFAULT_SKIP: u64 = 0;

/// Cap applied to `limit`.
pub const DEFAULT_LIMIT: u64 = 1000;

/// How far `maxdepth` may reach beyond the effective `mindepth`.
pub const MAX_DEPTH_SPAN: u64 = 2;

/// Validated `skip`/`limit` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: DEFAULT_SKIP,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// `skip` is checked before `limit`; both must be non-negative integers.
    pub fn from_params(params: &QueryParams) -> Result<Self> {
        let skip = validate_nonnegative("skip", params.get("skip"))?;
        let skip = set_default_minimum(skip, DEFAULT_SKIP);
        let limit = validate_nonnegative("limit", params.get("limit"))?;
        let limit = set_default_maximum(limit, DEFAULT_LIMIT);
        Ok(Self { skip, limit })
    }

    /// 1-based position of the first row of this page.
    pub fn first_position(&self) -> u64 {
        self.skip + 1
    }
}

/// Depth rules of a traversal endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthPolicy {
    /// Floor for `mindepth`.
    pub default_min: u64,
    /// Largest `mindepth` the endpoint accepts, if bounded.
    pub max_min: Option<u64>,
}

impl DepthPolicy {
    /// Path expansion: paths have at least one hop.
    pub const EXPAND: DepthPolicy = DepthPolicy {
        default_min: 1,
        max_min: None,
    };

    /// Spanning trees may include the root (depth 0) and start no deeper than 1.
    pub const TREES: DepthPolicy = DepthPolicy {
        default_min: 0,
        max_min: Some(1),
    };
}

/// Effective inclusive `mindepth..=maxdepth` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthRange {
    pub min: u64,
    pub max: u64,
}

impl DepthRange {
    /// Checks run in this order: `maxdepth` non-negative, `mindepth`
    /// non-negative, `mindepth` floor, `mindepth` bound, range order. Only
    /// after the order check is `maxdepth` clamped to `mindepth + 2`, so a
    /// caller-supplied `maxdepth` below the effective `mindepth` is rejected
    /// rather than silently raised.
    pub fn from_params(params: &QueryParams, policy: DepthPolicy) -> Result<Self> {
        let maxdepth = validate_nonnegative("maxdepth", params.get("maxdepth"))?;
        let mindepth = validate_nonnegative("mindepth", params.get("mindepth"))?;
        let min = set_default_minimum(mindepth, policy.default_min);

        if let Some(bound) = policy.max_min {
            if min > bound {
                return Err(ApiError::validation(format!(
                    "Invalid value for 'mindepth' {min}. The 'mindepth' parameter value for a spanning tree \
                     can be either 0 or {bound}."
                )));
            }
        }

        if let Some(max) = maxdepth {
            validate_range_order("mindepth", min, "maxdepth", max)?;
        }

        let max = set_default_maximum(maxdepth, min + MAX_DEPTH_SPAN);
        Ok(Self { min, max })
    }
}

/// Parsed `relsequence`: parallel lists of relationship SABs and types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelSequence {
    pub sabs: Vec<String>,
    pub types: Vec<String>,
}

impl RelSequence {
    /// Parse `SAB:type` entries. SABs are upper-cased; the type is kept as
    /// given. An entry without `:` (or with an empty side) is rejected.
    pub fn parse(entries: &[String]) -> Result<Self> {
        let mut sabs = Vec::with_capacity(entries.len());
        let mut types = Vec::with_capacity(entries.len());
        for entry in entries {
            let parsed = entry
                .split_once(':')
                .filter(|(sab, rel)| !sab.is_empty() && !rel.is_empty());
            let Some((sab, rel)) = parsed else {
                return Err(ApiError::validation(format!(
                    "Invalid parameter value for 'relsequence': {entry}. \
                     Format relationships as <SAB>:<relationship_type>"
                )));
            };
            sabs.push(sab.to_uppercase());
            types.push(rel.to_string());
        }
        Ok(Self { sabs, types })
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
