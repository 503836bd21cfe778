// crates/blobcheck-validate/src/error.rs
// ============================================================================
// Module: Validation Errors
// Description: Phase-annotated failures, run outcomes, and teardown errors.
// Purpose: Tell the operator which step failed and why.
// Dependencies: blobcheck-core, thiserror
// ============================================================================

//! ## Overview
//! Phase-annotated failures, run outcomes, and teardown errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use blobcheck_core::ClusterError;
use blobcheck_core::Report;
use thiserror::Error;

// ============================================================================
// SECTION: Phases
// ============================================================================

/// Validation step, used to annotate failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Source and restored database setup plus the unfinished-job check.
    Setup,
    /// External connection registration.
    Register,
    /// Initial per-node statistics.
    InitialStats,
    /// Serial workload burst before backups.
    InitialWorkload,
    /// Concurrent workers alongside the full backup.
    FullBackup,
    /// Incremental backup after workers stop.
    IncrementalBackup,
    /// Backup collection and entry counts.
    CheckBackups,
    /// Restore into the restored database.
    Restore,
    /// Source and restored fingerprints.
    Integrity,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Setup => "table setup",
            Self::Register => "external connection registration",
            Self::InitialStats => "initial statistics",
            Self::InitialWorkload => "initial workload",
            Self::FullBackup => "workload with full backup",
            Self::IncrementalBackup => "incremental backup",
            Self::CheckBackups => "backup verification",
            Self::Restore => "restore",
            Self::Integrity => "integrity check",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure inside one phase.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    /// A database call failed.
    #[error(transparent)]
    Cluster(#[from] ClusterError),
    /// The connection was created but the database could not list backups
    /// through it.
    #[error("external connection failed: {0}")]
    RegistrationFailed(ClusterError),
    /// Cluster state does not match what this run produced.
    #[error("{0}")]
    StateMismatch(String),
    /// A background task panicked or was aborted.
    #[error("background task failed: {0}")]
    Task(String),
}

/// Validation run errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Inputs rejected before any resource was created.
    #[error("preflight check failed: {0}")]
    Preflight(String),
    /// A phase failed.
    #[error("{phase} failed: {source}")]
    Phase {
        /// Failing phase.
        phase: Phase,
        /// Underlying failure.
        source: PhaseError,
    },
}

impl ValidationError {
    /// Returns the failing phase, if any.
    #[must_use]
    pub const fn phase(&self) -> Option<Phase> {
        match self {
            Self::Preflight(_) => None,
            Self::Phase {
                phase, ..
            } => Some(*phase),
        }
    }
}

/// How a validation run ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every phase ran; the report may still be degraded.
    Completed(Report),
    /// The stop signal was observed before the run finished.
    Cancelled,
}

// ============================================================================
// SECTION: Teardown
// ============================================================================

/// One resource that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownFailure {
    /// Resource description.
    pub resource: String,
    /// Failure message.
    pub message: String,
}

/// Every failure observed while tearing down a run.
///
/// # Invariants
/// - `failures` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("teardown failed: {}", join_failures(.failures))]
pub struct TeardownError {
    /// Failures in attempt order.
    pub failures: Vec<TeardownFailure>,
}

/// Renders failures as `resource: message` pairs separated by `; `.
fn join_failures(failures: &[TeardownFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("{}: {}", failure.resource, failure.message))
        .collect::<Vec<_>>()
        .join("; ")
}
