// crates/blobcheck-core/src/core/report.rs
// ============================================================================
// Module: Validation Report
// Description: Result of a discovery or full validation run.
// Purpose: Carry suggested parameters, node statistics, and integrity status.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Report`] is built once at the end of a run and never mutated. Only
//! the obfuscated parameter view is stored, so a report can be rendered or
//! serialized without leaking credentials. Discovery-only runs produce a
//! report with no statistics and [`Integrity::Skipped`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::backup::NodeStats;
use crate::core::params::ParameterSet;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Outcome of the post-restore fingerprint comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrity {
    /// Source and restored fingerprints matched.
    Verified,
    /// Fingerprints differed; the report is degraded.
    Mismatch,
    /// No restore was performed (discovery only).
    Skipped,
}

/// Immutable result of a validation run.
///
/// # Invariants
/// - `suggested_params` is always the obfuscated view.
/// - `stats` is `None` when statistics were not collected at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Parameters that worked, with secrets obfuscated.
    pub suggested_params: ParameterSet,
    /// Per-node transfer statistics.
    pub stats: Option<Vec<NodeStats>>,
    /// Restore integrity outcome.
    pub integrity: Integrity,
}

impl Report {
    /// Builds a discovery-only report with no statistics.
    #[must_use]
    pub fn suggestion(params: &ParameterSet) -> Self {
        Self {
            suggested_params: params.obfuscated(),
            stats: None,
            integrity: Integrity::Skipped,
        }
    }
}
