// crates/blobcheck-core/src/runtime/discovery.rs
// ============================================================================
// Module: Discovery Engine
// Description: Drives candidate destinations through the storage probe.
// Purpose: Find the first parameter combination the provider accepts.
// Dependencies: crate::core, crate::interfaces, thiserror, tracing
// ============================================================================

//! ## Overview
//! The engine walks the [`CandidateGenerator`] sequence in order and stops at
//! the first candidate whose probe succeeds. Exactly one probe is issued per
//! candidate and none after success. When every candidate is rejected the
//! run fails with [`DiscoveryError::StorageUnreachable`].
//!
//! State transitions:
//! `NotStarted -> Trying(i) -> {Success(i) | Trying(i + 1)} -> Exhausted`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use tracing::info;
use tracing::warn;

use crate::core::Destination;
use crate::interfaces::ObjectStoreConnector;
use crate::interfaces::StorageError;
use crate::runtime::candidates::CandidateGenerator;
use crate::runtime::probe::ProbeFailure;
use crate::runtime::probe::probe;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Discovery errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// Every candidate was rejected.
    #[error("unable to connect to storage provider {destination:?} after {attempts} attempts")]
    StorageUnreachable {
        /// Destination URL without parameters.
        destination: String,
        /// Number of probes issued.
        attempts: usize,
    },
    /// Read-back content differed from what was written.
    #[error("unexpected content: got {got:?}, want {want:?}")]
    ProbeAnomaly {
        /// Content read back.
        got: String,
        /// Content written.
        want: String,
    },
    /// A storage failure after the candidate was accepted.
    #[error("storage probe failed: {0}")]
    Storage(StorageError),
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Discovery progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    /// No candidate probed yet.
    NotStarted,
    /// Probing the candidate at this zero-based index.
    Trying(usize),
    /// The candidate at this index succeeded.
    Success(usize),
    /// Every candidate was rejected.
    Exhausted,
    /// A fatal probe failure stopped discovery.
    Aborted,
}

/// Sequential candidate search.
pub struct DiscoveryEngine<'a> {
    /// Client factory used for each candidate.
    connector: &'a dyn ObjectStoreConnector,
    /// Remaining candidates.
    candidates: CandidateGenerator,
    /// Base destination, used for error reporting.
    base: Destination,
    /// Current state.
    state: DiscoveryState,
    /// Probes issued so far.
    attempts: usize,
}

impl<'a> DiscoveryEngine<'a> {
    /// Creates an engine over the default toggles for `base`.
    #[must_use]
    pub fn new(connector: &'a dyn ObjectStoreConnector, base: Destination) -> Self {
        let candidates = CandidateGenerator::new(base.clone());
        Self::with_candidates(connector, base, candidates)
    }

    /// Creates an engine over an explicit candidate sequence.
    #[must_use]
    pub const fn with_candidates(
        connector: &'a dyn ObjectStoreConnector,
        base: Destination,
        candidates: CandidateGenerator,
    ) -> Self {
        Self {
            connector,
            candidates,
            base,
            state: DiscoveryState::NotStarted,
            attempts: 0,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> DiscoveryState {
        self.state
    }

    /// Returns the number of probes issued.
    #[must_use]
    pub const fn attempts(&self) -> usize {
        self.attempts
    }

    /// Probes candidates until one succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::StorageUnreachable`] when every candidate is
    /// rejected, or the fatal error that stopped the search.
    pub fn run(&mut self) -> Result<Destination, DiscoveryError> {
        let total = self.candidates.candidate_count();
        for candidate in self.candidates.by_ref() {
            let index = self.attempts;
            self.state = DiscoveryState::Trying(index);
            self.attempts += 1;
            info!(
                destination = %candidate,
                params = %candidate.params().obfuscated(),
                attempt = self.attempts,
                total,
                "probing storage candidate"
            );
            match probe(self.connector, &candidate) {
                Ok(()) => {
                    self.state = DiscoveryState::Success(index);
                    info!(attempt = self.attempts, "storage candidate accepted");
                    return Ok(candidate);
                }
                Err(ProbeFailure::Rejected(err)) => {
                    warn!(attempt = self.attempts, error = %err, "storage candidate rejected");
                }
                Err(ProbeFailure::Fatal(err)) => {
                    self.state = DiscoveryState::Aborted;
                    return Err(err);
                }
            }
        }
        self.state = DiscoveryState::Exhausted;
        Err(DiscoveryError::StorageUnreachable {
            destination: self.base.to_string(),
            attempts: self.attempts,
        })
    }
}

/// Runs discovery over the default toggles and returns the working candidate.
///
/// # Errors
///
/// Returns [`DiscoveryError`] as described on [`DiscoveryEngine::run`].
pub fn discover(
    connector: &dyn ObjectStoreConnector,
    base: Destination,
) -> Result<Destination, DiscoveryError> {
    DiscoveryEngine::new(connector, base).run()
}
