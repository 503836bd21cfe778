// crates/blobcheck-validate/tests/connection.rs
// ============================================================================
// Module: External Connection Tests
// Description: Registration, metadata ordering, statistics gating, and drops.
// Purpose: Check the connection manager against the in-memory cluster.
// Dependencies: blobcheck-validate, blobcheck-core
// ============================================================================

//! External connection tests for blobcheck-validate.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod helpers;

use std::sync::Arc;

use blobcheck_core::BackupKind;
use blobcheck_core::Cluster;
use blobcheck_core::Ident;
use blobcheck_core::ServerVersion;
use blobcheck_validate::CONNECTION_NAME;
use blobcheck_validate::ExternalConnection;
use blobcheck_validate::PhaseError;
use helpers::FakeCluster;
use helpers::Faults;
use helpers::destination;
use helpers::table;

fn register(cluster: &Arc<FakeCluster>) -> Result<ExternalConnection, PhaseError> {
    ExternalConnection::register(
        cluster.clone(),
        Ident::new(CONNECTION_NAME).unwrap(),
        destination(),
    )
}

#[test]
fn register_creates_connection_with_canonical_url() {
    let cluster = Arc::new(FakeCluster::default());
    let connection = register(&cluster).unwrap();

    assert_eq!(connection.name().as_str(), CONNECTION_NAME);
    assert_eq!(cluster.state().connections.get(CONNECTION_NAME), Some(&destination().url()));
    assert!(connection.list_backup_collections().unwrap().is_empty());
}

#[test]
fn register_twice_replaces_connection() {
    let cluster = Arc::new(FakeCluster::default());
    register(&cluster).unwrap();
    register(&cluster).unwrap();
    assert_eq!(cluster.state().connections.len(), 1);
}

#[test]
fn drop_is_idempotent() {
    let cluster = Arc::new(FakeCluster::default());
    let connection = register(&cluster).unwrap();

    connection.drop_connection().unwrap();
    connection.drop_connection().unwrap();
    assert!(cluster.state().connections.is_empty());
}

#[test]
fn backup_info_is_newest_first_and_filtered() {
    let cluster = Arc::new(FakeCluster::default());
    let source = table("_blobcheck");
    let other = table("_other");
    for t in [&source, &other] {
        cluster.create_database(&t.database).unwrap();
        cluster.create_table(t).unwrap();
    }
    let connection = register(&cluster).unwrap();
    cluster.backup(&source, connection.name(), BackupKind::Full).unwrap();
    cluster.backup(&other, connection.name(), BackupKind::Incremental).unwrap();
    cluster.backup(&source, connection.name(), BackupKind::Incremental).unwrap();

    let collections = connection.list_backup_collections().unwrap();
    assert_eq!(collections.len(), 1);
    let backups = connection.backup_info(&collections[0], &source).unwrap();

    let kinds: Vec<BackupKind> = backups.iter().map(|backup| backup.kind).collect();
    assert_eq!(kinds, vec![BackupKind::Incremental, BackupKind::Full]);
    assert!(backups[0].end_time > backups[1].end_time);
    assert!(backups.iter().all(|backup| backup.table == source));
}

#[test]
fn stats_are_gated_by_server_version() {
    let cluster = Arc::new(FakeCluster::with_faults(Faults {
        version: ServerVersion::new(24, 1, 0),
        ..Faults::default()
    }));
    let connection = register(&cluster).unwrap();
    assert_eq!(connection.stats().unwrap(), None);
    assert_eq!(connection.check().unwrap().len(), 3);

    cluster.state().faults.version = ServerVersion::MIN_FOR_STATS;
    let stats = connection.stats().unwrap().unwrap();
    assert_eq!(stats.len(), 3);
    assert_eq!(stats[2].error, "timeout");
}

#[test]
fn suggested_params_hide_secrets() {
    let cluster = Arc::new(FakeCluster::default());
    let connection = register(&cluster).unwrap();
    let params = connection.suggested_params();
    assert!(!params.to_string().contains("minio-secret"));
    assert_eq!(params.len(), connection.destination().params().len());
}
