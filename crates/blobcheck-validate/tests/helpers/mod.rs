// crates/blobcheck-validate/tests/helpers/mod.rs
// ============================================================================
// Module: Validation Test Helpers
// Description: In-memory cluster with fault injection.
// Purpose: Exercise the orchestrator without a live database.
// Dependencies: blobcheck-core, time, tokio-util
// ============================================================================

//! ## Overview
//! [`FakeCluster`] keeps tables as ordered maps and models backups as row
//! snapshots grouped into collections. Faults are toggled through
//! [`Faults`] before a run.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::MutexGuard;

use blobcheck_core::BackupKind;
use blobcheck_core::Cluster;
use blobcheck_core::ClusterError;
use blobcheck_core::Database;
use blobcheck_core::Destination;
use blobcheck_core::Ident;
use blobcheck_core::KvTable;
use blobcheck_core::NodeStats;
use blobcheck_core::ParamKey;
use blobcheck_core::ParameterSet;
use blobcheck_core::ServerVersion;
use blobcheck_core::TableBackup;
use blobcheck_core::fingerprint_rows;
use time::Duration;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

/// Rows of one table.
pub type Rows = BTreeMap<String, String>;

/// Fault switches.
#[derive(Debug, Clone)]
pub struct Faults {
    /// Record incremental backups as full ones.
    pub duplicate_full: bool,
    /// Add a stray row to restored tables.
    pub corrupt_restore: bool,
    /// Fail backup listing through external connections.
    pub fail_listing: bool,
    /// Job ids reported as unfinished.
    pub unfinished_jobs: Vec<i64>,
    /// Databases whose drop fails.
    pub fail_drop: BTreeSet<String>,
    /// Reported server version.
    pub version: ServerVersion,
    /// Token cancelled whenever a table is fingerprinted.
    pub cancel_on_fingerprint: Option<CancellationToken>,
}

impl Default for Faults {
    fn default() -> Self {
        Self {
            duplicate_full: false,
            corrupt_restore: false,
            fail_listing: false,
            unfinished_jobs: Vec::new(),
            fail_drop: BTreeSet::new(),
            version: ServerVersion::new(25, 2, 0),
            cancel_on_fingerprint: None,
        }
    }
}

/// One backup entry with the rows it captured.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Table backed up.
    pub table: KvTable,
    /// Full or incremental.
    pub kind: BackupKind,
    /// Rows at backup time.
    pub rows: Rows,
}

/// Cluster state.
#[derive(Debug, Default)]
pub struct State {
    /// Existing databases.
    pub databases: BTreeSet<String>,
    /// Tables keyed by qualified name.
    pub tables: BTreeMap<String, Rows>,
    /// External connections by name.
    pub connections: BTreeMap<String, String>,
    /// Collections in creation order.
    pub collections: Vec<(String, Vec<Snapshot>)>,
    /// Upserts performed.
    pub upserts: usize,
    /// Faults in effect.
    pub faults: Faults,
}

/// In-memory [`Cluster`].
#[derive(Debug, Default)]
pub struct FakeCluster {
    /// Shared state.
    state: Mutex<State>,
}

impl FakeCluster {
    /// Creates a cluster with the given faults.
    pub fn with_faults(faults: Faults) -> Self {
        let cluster = Self::default();
        cluster.state().faults = faults;
        cluster
    }

    /// Locks the state.
    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Returns a copy of a table's rows.
    pub fn rows(&self, table: &KvTable) -> Option<Rows> {
        self.state().tables.get(&table.to_string()).cloned()
    }
}

/// Error for a missing object.
fn missing(what: &str) -> ClusterError {
    ClusterError::Query(format!("{what} does not exist"))
}

impl Cluster for FakeCluster {
    fn create_database(&self, database: &Database) -> Result<(), ClusterError> {
        self.state().databases.insert(database.to_string());
        Ok(())
    }

    fn drop_database(&self, database: &Database) -> Result<(), ClusterError> {
        let mut state = self.state();
        let name = database.to_string();
        if state.faults.fail_drop.contains(&name) {
            return Err(ClusterError::Query(format!("cannot drop {name}")));
        }
        state.databases.remove(&name);
        let prefix = format!("{name}.");
        state.tables.retain(|table, _| !table.starts_with(&prefix));
        Ok(())
    }

    fn create_table(&self, table: &KvTable) -> Result<(), ClusterError> {
        let mut state = self.state();
        if !state.databases.contains(&table.database.to_string()) {
            return Err(missing(&table.database.to_string()));
        }
        state.tables.entry(table.to_string()).or_default();
        Ok(())
    }

    fn drop_table(&self, table: &KvTable) -> Result<(), ClusterError> {
        self.state().tables.remove(&table.to_string());
        Ok(())
    }

    fn insert(&self, table: &KvTable, key: &str, value: &str) -> Result<(), ClusterError> {
        let mut state = self.state();
        let rows = state.tables.get_mut(&table.to_string()).ok_or_else(|| missing("table"))?;
        if rows.contains_key(key) {
            return Err(ClusterError::Query(format!("duplicate key {key}")));
        }
        rows.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn upsert(&self, table: &KvTable, key: &str, value: &str) -> Result<(), ClusterError> {
        let mut state = self.state();
        let rows = state.tables.get_mut(&table.to_string()).ok_or_else(|| missing("table"))?;
        rows.insert(key.to_string(), value.to_string());
        state.upserts += 1;
        Ok(())
    }

    fn fingerprint(&self, table: &KvTable) -> Result<String, ClusterError> {
        let state = self.state();
        if let Some(stop) = &state.faults.cancel_on_fingerprint {
            stop.cancel();
        }
        let rows = state.tables.get(&table.to_string()).ok_or_else(|| missing("table"))?;
        Ok(fingerprint_rows(rows.iter().map(|(key, value)| (key.as_str(), value.as_str()))))
    }

    fn backup(
        &self,
        table: &KvTable,
        connection: &Ident,
        kind: BackupKind,
    ) -> Result<(), ClusterError> {
        let mut state = self.state();
        if !state.connections.contains_key(connection.as_str()) {
            return Err(missing("external connection"));
        }
        let rows = state.tables.get(&table.to_string()).cloned().ok_or_else(|| missing("table"))?;
        let recorded = if state.faults.duplicate_full { BackupKind::Full } else { kind };
        let snapshot = Snapshot {
            table: table.clone(),
            kind: recorded,
            rows,
        };
        match kind {
            BackupKind::Full => {
                let name = format!("/2025/06/01-12000{}.00", state.collections.len());
                state.collections.push((name, vec![snapshot]));
            }
            BackupKind::Incremental => {
                let (_, entries) =
                    state.collections.last_mut().ok_or_else(|| missing("backup collection"))?;
                entries.push(snapshot);
            }
        }
        Ok(())
    }

    fn restore(
        &self,
        target: &KvTable,
        source: &KvTable,
        _connection: &Ident,
        collection: &str,
    ) -> Result<(), ClusterError> {
        let mut state = self.state();
        let (_, entries) = state
            .collections
            .iter()
            .find(|(name, _)| name == collection)
            .ok_or_else(|| missing("backup collection"))?;
        let mut rows = entries
            .iter()
            .rev()
            .find(|snapshot| snapshot.table == *source)
            .map(|snapshot| snapshot.rows.clone())
            .ok_or_else(|| missing("table in backup"))?;
        if state.faults.corrupt_restore {
            rows.insert("stray".to_string(), "row".to_string());
        }
        if state.tables.contains_key(&target.to_string()) {
            return Err(ClusterError::Query(format!("relation {target} already exists")));
        }
        state.tables.insert(target.to_string(), rows);
        Ok(())
    }

    fn create_external_connection(&self, name: &Ident, url: &str) -> Result<(), ClusterError> {
        let mut state = self.state();
        if state.connections.contains_key(name.as_str()) {
            return Err(ClusterError::Query(format!("connection {name} already exists")));
        }
        state.connections.insert(name.to_string(), url.to_string());
        Ok(())
    }

    fn external_connection_exists(&self, name: &Ident) -> Result<bool, ClusterError> {
        Ok(self.state().connections.contains_key(name.as_str()))
    }

    fn drop_external_connection(&self, name: &Ident) -> Result<(), ClusterError> {
        self.state()
            .connections
            .remove(name.as_str())
            .map(|_| ())
            .ok_or_else(|| missing("external connection"))
    }

    fn list_backup_collections(&self, connection: &Ident) -> Result<Vec<String>, ClusterError> {
        let state = self.state();
        if state.faults.fail_listing {
            return Err(ClusterError::Query("access denied".to_string()));
        }
        if !state.connections.contains_key(connection.as_str()) {
            return Err(missing("external connection"));
        }
        Ok(state.collections.iter().map(|(name, _)| name.clone()).collect())
    }

    fn backup_info(
        &self,
        _connection: &Ident,
        collection: &str,
        table: &KvTable,
    ) -> Result<Vec<TableBackup>, ClusterError> {
        let state = self.state();
        let (_, entries) = state
            .collections
            .iter()
            .find(|(name, _)| name == collection)
            .ok_or_else(|| missing("backup collection"))?;
        let mut seconds = 0;
        let mut backups = Vec::new();
        for snapshot in entries {
            seconds += 60;
            if snapshot.table == *table {
                backups.push(TableBackup {
                    table: snapshot.table.clone(),
                    kind: snapshot.kind,
                    end_time: OffsetDateTime::UNIX_EPOCH + Duration::seconds(seconds),
                });
            }
        }
        Ok(backups)
    }

    fn check_external_connection(
        &self,
        _connection: &Ident,
    ) -> Result<Vec<NodeStats>, ClusterError> {
        Ok((1 ..= 3)
            .map(|node| NodeStats {
                node,
                locality: format!("region=us-east-{node}"),
                success: node != 3,
                error: if node == 3 { "timeout".to_string() } else { String::new() },
                transferred: "4.0 MiB".to_string(),
                read_speed: "40 MiB/s".to_string(),
                write_speed: "20 MiB/s".to_string(),
                can_delete: true,
            })
            .collect())
    }

    fn server_version(&self) -> Result<ServerVersion, ClusterError> {
        Ok(self.state().faults.version)
    }

    fn unfinished_jobs(&self, _table: &KvTable) -> Result<Vec<i64>, ClusterError> {
        Ok(self.state().faults.unfinished_jobs.clone())
    }
}

/// Destination with credentials and an endpoint.
pub fn destination() -> Destination {
    let mut params = ParameterSet::new();
    params.insert(ParamKey::AccessKeyId, "minioadmin");
    params.insert(ParamKey::SecretAccessKey, "minio-secret");
    params.insert(ParamKey::Endpoint, "http://localhost:9000");
    params.insert(ParamKey::UsePathStyle, "true");
    Destination::new("backups/cluster-a/run", params)
}

/// Builds `database.public.mytable`.
pub fn table(database: &str) -> KvTable {
    KvTable::in_public(
        Database {
            name: Ident::new(database).unwrap(),
        },
        Ident::new("mytable").unwrap(),
    )
}
