// crates/blobcheck-validate/src/validator.rs
// ============================================================================
// Module: Validation Orchestrator
// Description: Phase-by-phase backup and restore validation.
// Purpose: Prove a destination supports full, incremental, and restore flows.
// Dependencies: blobcheck-core, tokio, tokio-util, tracing
// ============================================================================

//! ## Overview
//! A run executes these phases in order, stopping at the first failure:
//! 1. setup: create the source table and restored database, then refuse to
//!    continue if backup or restore jobs on the source table are unfinished;
//! 2. register the external connection;
//! 3. capture initial node statistics (skipped on older servers);
//! 4. run a serial workload burst;
//! 5. run N workers and one full backup concurrently under a child scope;
//! 6. run an incremental backup once every worker has stopped;
//! 7. require exactly one collection holding one full and one incremental
//!    backup of the source table;
//! 8. restore the collection into the restored database;
//! 9. compare fingerprints; a mismatch is logged and degrades the report.
//!
//! The stop token is checked after every phase; once it fires the run
//! returns [`RunOutcome::Cancelled`]. [`Validator::clean`] must be called
//! afterwards regardless of outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use blobcheck_core::BackupKind;
use blobcheck_core::Cluster;
use blobcheck_core::Database;
use blobcheck_core::Destination;
use blobcheck_core::Ident;
use blobcheck_core::Integrity;
use blobcheck_core::KvTable;
use blobcheck_core::NodeStats;
use blobcheck_core::Report;
use blobcheck_core::TableBackup;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;

use crate::connection::CONNECTION_NAME;
use crate::connection::ExternalConnection;
use crate::connection::drop_if_exists;
use crate::error::Phase;
use crate::error::PhaseError;
use crate::error::RunOutcome;
use crate::error::TeardownError;
use crate::error::TeardownFailure;
use crate::error::ValidationError;
use crate::task::blocking;
use crate::workload::Workload;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Database holding the table that is backed up.
pub const SOURCE_DATABASE: &str = "_blobcheck";

/// Database the backup is restored into.
pub const RESTORED_DATABASE: &str = "_blobcheck_restored";

/// Table name in both databases.
pub const TABLE_NAME: &str = "mytable";

/// Backup collections a run must produce.
const EXPECTED_COLLECTIONS: usize = 1;

/// Backup entries a run must produce.
const EXPECTED_BACKUPS: usize = 2;

/// Full backups a run must produce.
const EXPECTED_FULL_BACKUPS: usize = 1;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Workload sizing for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Concurrent workers during the full backup.
    pub workers: usize,
    /// How long each workload burst runs.
    pub workload_duration: Duration,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            workers: 5,
            workload_duration: Duration::from_secs(5),
        }
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Orchestrates one validation run against a discovered destination.
pub struct Validator {
    /// Shared cluster client.
    cluster: Arc<dyn Cluster>,
    /// Destination that passed discovery.
    destination: Destination,
    /// Workload sizing.
    options: ValidatorOptions,
    /// Table that is written to and backed up.
    source: KvTable,
    /// Table created by the restore.
    restored: KvTable,
    /// External connection name.
    connection_name: Ident,
}

impl Validator {
    /// Creates a validator after checking its inputs.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Preflight`] when the destination has no
    /// bucket or the workload duration is zero.
    pub fn new(
        cluster: Arc<dyn Cluster>,
        destination: Destination,
        options: ValidatorOptions,
    ) -> Result<Self, ValidationError> {
        if destination.bucket_name().is_empty() {
            return Err(ValidationError::Preflight("destination bucket is empty".to_string()));
        }
        if options.workload_duration.is_zero() {
            return Err(ValidationError::Preflight(
                "workload duration must be positive".to_string(),
            ));
        }
        Ok(Self {
            cluster,
            destination,
            options,
            source: reserved_table(SOURCE_DATABASE)?,
            restored: reserved_table(RESTORED_DATABASE)?,
            connection_name: reserved_ident(CONNECTION_NAME)?,
        })
    }

    /// Returns the source table.
    #[must_use]
    pub const fn source_table(&self) -> &KvTable {
        &self.source
    }

    /// Returns the restored table.
    #[must_use]
    pub const fn restored_table(&self) -> &KvTable {
        &self.restored
    }

    /// Runs every phase.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Phase`] naming the first failed phase.
    pub async fn run(&self, stop: &CancellationToken) -> Result<RunOutcome, ValidationError> {
        if stop.is_cancelled() {
            return Ok(RunOutcome::Cancelled);
        }
        info!(destination = %self.destination, "starting validation");

        let Some(()) = checkpoint(stop, Phase::Setup, self.setup().await)? else {
            return Ok(RunOutcome::Cancelled);
        };
        let Some(connection) = checkpoint(stop, Phase::Register, self.register().await)? else {
            return Ok(RunOutcome::Cancelled);
        };
        let Some(stats) = checkpoint(stop, Phase::InitialStats, capture_stats(&connection).await)?
        else {
            return Ok(RunOutcome::Cancelled);
        };

        info!("running workload to populate some data");
        let workload = Workload::new(Arc::clone(&self.cluster), self.source.clone());
        let initial = workload.run_for(self.options.workload_duration, stop).await;
        let Some(_) = checkpoint(stop, Phase::InitialWorkload, initial)? else {
            return Ok(RunOutcome::Cancelled);
        };

        let concurrent = self.workload_with_full_backup(&connection, stop).await;
        let Some(()) = checkpoint(stop, Phase::FullBackup, concurrent)? else {
            return Ok(RunOutcome::Cancelled);
        };

        info!("starting incremental backup");
        let incremental = self.backup(&connection, BackupKind::Incremental).await;
        let Some(()) = checkpoint(stop, Phase::IncrementalBackup, incremental)? else {
            return Ok(RunOutcome::Cancelled);
        };

        let verified = self.verify_backups(&connection).await;
        let Some(collection) = checkpoint(stop, Phase::CheckBackups, verified)? else {
            return Ok(RunOutcome::Cancelled);
        };

        info!(collection, "restoring backup");
        let restore = self.restore(&connection, collection).await;
        let Some(()) = checkpoint(stop, Phase::Restore, restore)? else {
            return Ok(RunOutcome::Cancelled);
        };

        info!("checking integrity");
        // Integrity is the last phase; a late cancellation keeps the finished report.
        let integrity = self.integrity().await.map_err(|source| {
            error!(phase = %Phase::Integrity, error = %source, "validation phase failed");
            ValidationError::Phase {
                phase: Phase::Integrity,
                source,
            }
        })?;

        Ok(RunOutcome::Completed(Report {
            suggested_params: connection.suggested_params(),
            stats,
            integrity,
        }))
    }

    /// Drops the external connection and both databases. Every drop is
    /// attempted; failures are combined.
    ///
    /// # Errors
    ///
    /// Returns [`TeardownError`] listing every resource left behind.
    pub async fn clean(&self) -> Result<(), TeardownError> {
        let cluster = Arc::clone(&self.cluster);
        let name = self.connection_name.clone();
        let databases = [
            ("source database", self.source.database.clone()),
            ("restored database", self.restored.database.clone()),
        ];
        let outcome = blocking(move || {
            let mut failures = Vec::new();
            if let Err(err) = drop_if_exists(cluster.as_ref(), &name) {
                error!(connection = %name, error = %err, "drop external connection failed");
                failures.push(failure("external connection", &err));
            }
            for (resource, database) in &databases {
                if let Err(err) = cluster.drop_database(database) {
                    error!(database = %database, error = %err, "drop database failed");
                    failures.push(failure(resource, &err));
                }
            }
            Ok(failures)
        })
        .await;
        let failures = match outcome {
            Ok(failures) => failures,
            Err(err) => vec![failure("teardown task", &err)],
        };
        if failures.is_empty() {
            Ok(())
        } else {
            Err(TeardownError {
                failures,
            })
        }
    }

    // ------------------------------------------------------------------------
    // Phases
    // ------------------------------------------------------------------------

    /// Creates tables and checks for unfinished jobs.
    async fn setup(&self) -> Result<(), PhaseError> {
        let cluster = Arc::clone(&self.cluster);
        let source = self.source.clone();
        let restored = self.restored.clone();
        blocking(move || {
            cluster.create_database(&source.database)?;
            cluster.create_table(&source)?;
            cluster.create_database(&restored.database)?;
            cluster.drop_table(&restored)?;
            let jobs = cluster.unfinished_jobs(&source)?;
            if !jobs.is_empty() {
                let ids = jobs.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
                return Err(PhaseError::StateMismatch(format!(
                    "found {} unfinished backup or restore jobs on {source}: {ids}",
                    jobs.len()
                )));
            }
            Ok(())
        })
        .await
    }

    /// Registers the external connection.
    async fn register(&self) -> Result<ExternalConnection, PhaseError> {
        let cluster = Arc::clone(&self.cluster);
        let name = self.connection_name.clone();
        let destination = self.destination.clone();
        blocking(move || ExternalConnection::register(cluster, name, destination)).await
    }

    /// Runs workers alongside one full backup and waits for all of them.
    async fn workload_with_full_backup(
        &self,
        connection: &ExternalConnection,
        stop: &CancellationToken,
    ) -> Result<(), PhaseError> {
        let scope = stop.child_token();
        let mut tasks = JoinSet::new();
        for worker in 0 .. self.options.workers {
            let workload = Workload::new(Arc::clone(&self.cluster), self.source.clone());
            let duration = self.options.workload_duration;
            let scope = scope.clone();
            tasks.spawn(async move {
                info!(worker, "starting worker");
                match workload.run_for(duration, &scope).await {
                    Ok(_) => Ok(()),
                    Err(err) => {
                        error!(worker, error = %err, "worker failed");
                        Err(err)
                    }
                }
            });
        }

        let cluster = Arc::clone(&self.cluster);
        let source = self.source.clone();
        let name = connection.name().clone();
        tasks.spawn(async move {
            info!("starting full backup");
            blocking(move || {
                cluster.backup(&source, &name, BackupKind::Full).map_err(PhaseError::from)
            })
            .await
        });

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(err) => Err(PhaseError::Task(err.to_string())),
            };
            if let Err(err) = result
                && first_error.is_none()
            {
                scope.cancel();
                first_error = Some(err);
            }
        }
        info!("workers done");
        first_error.map_or(Ok(()), Err)
    }

    /// Issues one backup of the source table.
    async fn backup(
        &self,
        connection: &ExternalConnection,
        kind: BackupKind,
    ) -> Result<(), PhaseError> {
        let cluster = Arc::clone(&self.cluster);
        let source = self.source.clone();
        let name = connection.name().clone();
        blocking(move || cluster.backup(&source, &name, kind).map_err(PhaseError::from)).await
    }

    /// Checks the backup set and returns the collection to restore.
    async fn verify_backups(&self, connection: &ExternalConnection) -> Result<String, PhaseError> {
        let connection = connection.clone();
        let source = self.source.clone();
        blocking(move || {
            let collections = connection.list_backup_collections()?;
            let collection = single_collection(&collections)?.to_string();
            let backups = connection.backup_info(&collection, &source)?;
            check_backup_set(&backups)?;
            Ok(collection)
        })
        .await
    }

    /// Restores the collection into the restored database.
    async fn restore(
        &self,
        connection: &ExternalConnection,
        collection: String,
    ) -> Result<(), PhaseError> {
        let cluster = Arc::clone(&self.cluster);
        let source = self.source.clone();
        let restored = self.restored.clone();
        let name = connection.name().clone();
        blocking(move || {
            cluster.restore(&restored, &source, &name, &collection).map_err(PhaseError::from)
        })
        .await
    }

    /// Compares source and restored fingerprints.
    async fn integrity(&self) -> Result<Integrity, PhaseError> {
        let cluster = Arc::clone(&self.cluster);
        let source = self.source.clone();
        let restored = self.restored.clone();
        blocking(move || {
            let original = cluster.fingerprint(&source)?;
            let copy = cluster.fingerprint(&restored)?;
            if original == copy {
                info!(fingerprint = %original, "restored data matches original");
                Ok(Integrity::Verified)
            } else {
                error!(
                    original = %original,
                    restored = %copy,
                    "integrity check failed: restored data differs from original"
                );
                Ok(Integrity::Mismatch)
            }
        })
        .await
    }
}

// ============================================================================
// SECTION: Backup Set Checks
// ============================================================================

/// Returns the only backup collection.
///
/// # Errors
///
/// Returns [`PhaseError::StateMismatch`] unless exactly one collection exists.
pub fn single_collection(collections: &[String]) -> Result<&str, PhaseError> {
    match collections {
        [collection] => Ok(collection.as_str()),
        _ => Err(PhaseError::StateMismatch(format!(
            "expected exactly {EXPECTED_COLLECTIONS} backup collection, got {}",
            collections.len()
        ))),
    }
}

/// Requires exactly one full and one incremental backup.
///
/// # Errors
///
/// Returns [`PhaseError::StateMismatch`] describing the first violated count.
pub fn check_backup_set(backups: &[TableBackup]) -> Result<(), PhaseError> {
    if backups.len() != EXPECTED_BACKUPS {
        return Err(PhaseError::StateMismatch(format!(
            "expected exactly {EXPECTED_BACKUPS} backups (1 full, 1 incremental), got {} backups",
            backups.len()
        )));
    }
    let full = backups.iter().filter(|backup| backup.kind == BackupKind::Full).count();
    if full != EXPECTED_FULL_BACKUPS {
        return Err(PhaseError::StateMismatch(format!(
            "expected exactly {EXPECTED_FULL_BACKUPS} full backup, got {full}"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves a phase result against the stop signal. `Ok(None)` means the run
/// was cancelled.
fn checkpoint<T>(
    stop: &CancellationToken,
    phase: Phase,
    result: Result<T, PhaseError>,
) -> Result<Option<T>, ValidationError> {
    if stop.is_cancelled() {
        info!(%phase, "validation cancelled");
        return Ok(None);
    }
    match result {
        Ok(value) => Ok(Some(value)),
        Err(source) => {
            error!(%phase, error = %source, "validation phase failed");
            Err(ValidationError::Phase {
                phase,
                source,
            })
        }
    }
}

/// Captures initial statistics off the async threads.
async fn capture_stats(
    connection: &ExternalConnection,
) -> Result<Option<Vec<NodeStats>>, PhaseError> {
    info!("capturing initial statistics");
    let connection = connection.clone();
    blocking(move || connection.stats().map_err(PhaseError::from)).await
}

/// Builds `database.public.mytable`.
fn reserved_table(database: &str) -> Result<KvTable, ValidationError> {
    Ok(KvTable::in_public(
        Database {
            name: reserved_ident(database)?,
        },
        reserved_ident(TABLE_NAME)?,
    ))
}

/// Validates a reserved name.
fn reserved_ident(name: &str) -> Result<Ident, ValidationError> {
    Ident::new(name).map_err(|err| ValidationError::Preflight(err.to_string()))
}

/// Records one teardown failure.
fn failure(resource: &str, err: &dyn std::error::Error) -> TeardownFailure {
    TeardownFailure {
        resource: resource.to_string(),
        message: err.to_string(),
    }
}
