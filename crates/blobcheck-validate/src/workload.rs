// crates/blobcheck-validate/src/workload.rs
// ============================================================================
// Module: Workload Generator
// Description: Continuous synthetic upserts against a key/value table.
// Purpose: Keep writes flowing while backups run.
// Dependencies: blobcheck-core, tokio, tokio-util, tracing, uuid
// ============================================================================

//! ## Overview
//! A workload upserts `{prefix}-{n}` keys with random values, one row per
//! think-time tick, until its stop token fires. The prefix is unique per
//! workload so concurrent workers never write the same key. At least one row
//! is written before the stop token is consulted. Write failures end the
//! loop immediately; there is no retry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use blobcheck_core::Cluster;
use blobcheck_core::KvTable;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use uuid::Uuid;

use crate::error::PhaseError;
use crate::task::blocking;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Pause between consecutive writes.
pub const THINK_TIME: Duration = Duration::from_millis(1);

// ============================================================================
// SECTION: Workload
// ============================================================================

/// One synthetic writer.
pub struct Workload {
    /// Cluster receiving writes.
    cluster: Arc<dyn Cluster>,
    /// Target table.
    table: KvTable,
    /// Key prefix unique to this workload.
    prefix: String,
}

impl Workload {
    /// Creates a workload with a random key prefix.
    #[must_use]
    pub fn new(cluster: Arc<dyn Cluster>, table: KvTable) -> Self {
        Self::with_prefix(cluster, table, Uuid::new_v4().to_string())
    }

    /// Creates a workload with an explicit key prefix.
    #[must_use]
    pub fn with_prefix(
        cluster: Arc<dyn Cluster>,
        table: KvTable,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            cluster,
            table,
            prefix: prefix.into(),
        }
    }

    /// Returns the key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Writes rows until `stop` fires and returns the number written.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError`] for the first failed write.
    pub async fn run(&self, stop: &CancellationToken) -> Result<u64, PhaseError> {
        let mut written: u64 = 0;
        loop {
            let key = format!("{}-{written}", self.prefix);
            let value = Uuid::new_v4().to_string();
            let cluster = Arc::clone(&self.cluster);
            let table = self.table.clone();
            let row = key.clone();
            let outcome =
                blocking(move || cluster.upsert(&table, &row, &value).map_err(PhaseError::from))
                    .await;
            if let Err(err) = outcome {
                error!(key, error = %err, "failed to upsert row");
                return Err(err);
            }
            written += 1;
            tokio::select! {
                biased;
                () = stop.cancelled() => break,
                () = tokio::time::sleep(THINK_TIME) => {}
            }
        }
        debug!(prefix = %self.prefix, written, "workload stopped");
        Ok(written)
    }

    /// Writes rows for `duration` or until `stop` fires, whichever comes
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError`] for the first failed write.
    pub async fn run_for(
        &self,
        duration: Duration,
        stop: &CancellationToken,
    ) -> Result<u64, PhaseError> {
        let scope = stop.child_token();
        let timer = {
            let scope = scope.clone();
            tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                scope.cancel();
            })
        };
        let result = self.run(&scope).await;
        timer.abort();
        result
    }
}
