// crates/blobcheck-core/src/runtime/probe.rs
// ============================================================================
// Module: Storage Probe
// Description: List, write, read-back, and delete self-test for one candidate.
// Purpose: Decide whether a candidate destination is usable.
// Dependencies: crate::core, crate::interfaces, tracing
// ============================================================================

//! ## Overview
//! A probe exercises one candidate against the live provider:
//! 1. list the bucket,
//! 2. write a fixed payload at [`PROBE_KEY`] under the destination prefix,
//! 3. read it back and compare,
//! 4. delete it.
//!
//! Steps 1 and 2 failing means the candidate is wrong and the next one should
//! be tried. Anything after a successful write is treated as fatal: the
//! provider accepted our parameters, so a read failure, content mismatch, or
//! delete failure is not a configuration problem that another candidate
//! would fix.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::debug;

use crate::core::Destination;
use crate::interfaces::ObjectStoreConnector;
use crate::interfaces::StorageError;
use crate::runtime::discovery::DiscoveryError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Object key written by the probe, relative to the destination prefix.
pub const PROBE_KEY: &str = "_blobcheck";

/// Payload written and read back by the probe.
pub const PROBE_PAYLOAD: &[u8] = b"dummy_data";

// ============================================================================
// SECTION: Probe
// ============================================================================

/// Why a probe did not succeed.
#[derive(Debug)]
pub enum ProbeFailure {
    /// The candidate is not usable; discovery moves on.
    Rejected(StorageError),
    /// Discovery must stop.
    Fatal(DiscoveryError),
}

/// Runs the storage self-test against one candidate.
///
/// # Errors
///
/// Returns [`ProbeFailure::Rejected`] when listing or writing fails and
/// [`ProbeFailure::Fatal`] for client setup, read, mismatch, or delete
/// failures.
pub fn probe(
    connector: &dyn ObjectStoreConnector,
    candidate: &Destination,
) -> Result<(), ProbeFailure> {
    let store = connector
        .connect(candidate)
        .map_err(|err| ProbeFailure::Fatal(DiscoveryError::Storage(err)))?;
    let bucket = candidate.bucket_name();
    let key = candidate.object_key(PROBE_KEY);

    let listed = store.list(bucket).map_err(ProbeFailure::Rejected)?;
    debug!(bucket, objects = listed.len(), "probe listed bucket");

    store.put(bucket, &key, PROBE_PAYLOAD).map_err(ProbeFailure::Rejected)?;
    debug!(bucket, key = %key, "probe wrote object");

    let body = store
        .get(bucket, &key)
        .map_err(|err| ProbeFailure::Fatal(DiscoveryError::Storage(err)))?;
    if body != PROBE_PAYLOAD {
        return Err(ProbeFailure::Fatal(DiscoveryError::ProbeAnomaly {
            got: String::from_utf8_lossy(&body).into_owned(),
            want: String::from_utf8_lossy(PROBE_PAYLOAD).into_owned(),
        }));
    }

    store
        .delete(bucket, &key)
        .map_err(|err| ProbeFailure::Fatal(DiscoveryError::Storage(err)))?;
    debug!(bucket, key = %key, "probe deleted object");
    Ok(())
}
