// crates/blobcheck-validate/src/connection.rs
// ============================================================================
// Module: External Connection
// Description: Named database-side handle for the discovered destination.
// Purpose: Register the destination and query backups and node statistics.
// Dependencies: blobcheck-core, tracing
// ============================================================================

//! ## Overview
//! Backup and restore statements address storage through a named external
//! connection rather than a raw URL. Registration replaces any connection of
//! the same name, then lists backups through it: the database reaches storage
//! over its own network path, which can fail even when the local probe
//! succeeded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use blobcheck_core::Cluster;
use blobcheck_core::ClusterError;
use blobcheck_core::Destination;
use blobcheck_core::Ident;
use blobcheck_core::KvTable;
use blobcheck_core::NodeStats;
use blobcheck_core::ParameterSet;
use blobcheck_core::ServerVersion;
use blobcheck_core::TableBackup;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::error::PhaseError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Reserved external connection name.
pub const CONNECTION_NAME: &str = "_blobcheck_backup";

// ============================================================================
// SECTION: Connection
// ============================================================================

/// A registered external connection bound to one destination.
///
/// # Invariants
/// - The connection existed in the cluster when this value was created.
#[derive(Clone)]
pub struct ExternalConnection {
    /// Cluster holding the connection.
    cluster: Arc<dyn Cluster>,
    /// Connection name.
    name: Ident,
    /// Destination the connection points at.
    destination: Destination,
}

impl ExternalConnection {
    /// Registers `destination` under `name`, replacing an existing
    /// connection of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::Cluster`] when the connection cannot be
    /// replaced or created, and [`PhaseError::RegistrationFailed`] when the
    /// database cannot list backups through it.
    pub fn register(
        cluster: Arc<dyn Cluster>,
        name: Ident,
        destination: Destination,
    ) -> Result<Self, PhaseError> {
        drop_if_exists(cluster.as_ref(), &name)?;
        info!(connection = %name, destination = %destination, "creating external connection");
        cluster.create_external_connection(&name, &destination.url())?;
        if let Err(err) = cluster.list_backup_collections(&name) {
            warn!(connection = %name, error = %err, "listing backups through connection failed");
            return Err(PhaseError::RegistrationFailed(err));
        }
        Ok(Self {
            cluster,
            name,
            destination,
        })
    }

    /// Returns the connection name.
    #[must_use]
    pub const fn name(&self) -> &Ident {
        &self.name
    }

    /// Returns the destination.
    #[must_use]
    pub const fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Returns the parameters that worked, with secrets obfuscated.
    #[must_use]
    pub fn suggested_params(&self) -> ParameterSet {
        self.destination.params().obfuscated()
    }

    /// Lists backup collections stored behind the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the listing fails.
    pub fn list_backup_collections(&self) -> Result<Vec<String>, ClusterError> {
        self.cluster.list_backup_collections(&self.name)
    }

    /// Returns backup entries for `table` in `collection`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the metadata query fails.
    pub fn backup_info(
        &self,
        collection: &str,
        table: &KvTable,
    ) -> Result<Vec<TableBackup>, ClusterError> {
        let mut backups = self.cluster.backup_info(&self.name, collection, table)?;
        backups.retain(|backup| backup.table == *table);
        backups.sort_by(|left, right| right.end_time.cmp(&left.end_time));
        Ok(backups)
    }

    /// Runs the connectivity and throughput check on every node.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the check statement fails.
    pub fn check(&self) -> Result<Vec<NodeStats>, ClusterError> {
        let stats = self.cluster.check_external_connection(&self.name)?;
        debug!(connection = %self.name, nodes = stats.len(), "external connection checked");
        Ok(stats)
    }

    /// Returns per-node statistics, or `None` when the server predates
    /// [`ServerVersion::MIN_FOR_STATS`].
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the version query or the check fails.
    pub fn stats(&self) -> Result<Option<Vec<NodeStats>>, ClusterError> {
        let version = self.cluster.server_version()?;
        if !version.at_least(ServerVersion::MIN_FOR_STATS) {
            warn!(
                %version,
                minimum = %ServerVersion::MIN_FOR_STATS,
                "server version predates connection checks; statistics are not available"
            );
            return Ok(None);
        }
        self.check().map(Some)
    }

    /// Removes the connection. Absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the lookup or drop fails.
    pub fn drop_connection(&self) -> Result<(), ClusterError> {
        drop_if_exists(self.cluster.as_ref(), &self.name)
    }
}

/// Drops the named connection when it exists.
pub(crate) fn drop_if_exists(cluster: &dyn Cluster, name: &Ident) -> Result<(), ClusterError> {
    if cluster.external_connection_exists(name)? {
        info!(connection = %name, "dropping external connection");
        cluster.drop_external_connection(name)?;
    }
    Ok(())
}
