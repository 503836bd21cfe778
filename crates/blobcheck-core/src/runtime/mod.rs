// crates/blobcheck-core/src/runtime/mod.rs
// ============================================================================
// Module: Blobcheck Discovery Runtime
// Description: Candidate generation, storage probing, and discovery.
// Purpose: Find storage parameters that work against a live provider.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Discovery is a blocking, sequential search. Concurrency is left to the
//! caller; the CLI runs it on a blocking worker thread.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod candidates;
pub mod discovery;
pub mod probe;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use candidates::CandidateGenerator;
pub use candidates::DEFAULT_TOGGLES;
pub use discovery::DiscoveryEngine;
pub use discovery::DiscoveryError;
pub use discovery::DiscoveryState;
pub use discovery::discover;
pub use probe::PROBE_KEY;
pub use probe::PROBE_PAYLOAD;
pub use probe::ProbeFailure;
pub use probe::probe;
