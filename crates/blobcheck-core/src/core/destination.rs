// crates/blobcheck-core/src/core/destination.rs
// ============================================================================
// Module: Storage Destination
// Description: Bucket path plus connection parameters for a backup target.
// Purpose: Produce canonical backup URLs and bucket/prefix accessors.
// Dependencies: crate::core::params
// ============================================================================

//! ## Overview
//! A [`Destination`] pairs a normalized `bucket[/prefix...]` path with a
//! [`ParameterSet`]. It is immutable; candidate variants are produced by
//! [`Destination::with_params`], which clones the path and swaps the
//! parameters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::params::ParameterSet;

// ============================================================================
// SECTION: Destination
// ============================================================================

/// Object storage location and connection parameters.
///
/// # Invariants
/// - `path` has no leading, trailing, or repeated `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Normalized `bucket/prefix` path.
    path: String,
    /// Connection parameters.
    params: ParameterSet,
}

impl Destination {
    /// Creates a destination, normalizing path separators.
    #[must_use]
    pub fn new(path: &str, params: ParameterSet) -> Self {
        Self {
            path: normalize_path(path),
            params,
        }
    }

    /// Returns a copy of this destination carrying different parameters.
    #[must_use]
    pub fn with_params(&self, params: ParameterSet) -> Self {
        Self {
            path: self.path.clone(),
            params,
        }
    }

    /// Returns the normalized `bucket/prefix` path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the connection parameters.
    #[must_use]
    pub const fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Returns the bucket name, the first path component.
    #[must_use]
    pub fn bucket_name(&self) -> &str {
        self.path.split('/').next().unwrap_or_default()
    }

    /// Returns the key prefix inside the bucket, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.path.split_once('/').map(|(_, prefix)| prefix)
    }

    /// Returns `key` placed under the destination prefix.
    #[must_use]
    pub fn object_key(&self, key: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{prefix}/{key}"),
            None => key.to_string(),
        }
    }

    /// Returns the canonical `s3://bucket/path?params` URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!("s3://{}?{}", self.path, self.params.escaped_query())
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}", self.path)
    }
}

/// Drops empty components so `/a//b/` becomes `a/b`.
fn normalize_path(path: &str) -> String {
    path.split('/').filter(|segment| !segment.is_empty()).collect::<Vec<_>>().join("/")
}
