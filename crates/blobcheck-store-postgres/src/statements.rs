// crates/blobcheck-store-postgres/src/statements.rs
// ============================================================================
// Module: SQL Statements
// Description: CockroachDB statement text for tables, backups, and connections.
// Purpose: Keep statement construction pure and testable.
// Dependencies: blobcheck-core
// ============================================================================

//! ## Overview
//! Object names come from [`Ident`] and need no quoting. Free-form strings
//! (connection URLs, collection paths) are embedded as SQL string literals
//! through [`quote_literal`]. Row values are always bound as parameters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use blobcheck_core::BackupKind;
use blobcheck_core::Database;
use blobcheck_core::Ident;
use blobcheck_core::KvTable;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Job types inspected for unfinished work.
const TRACKED_JOB_TYPES: &str = "'BACKUP', 'RESTORE'";

/// Job statuses that have not reached a terminal state.
const UNFINISHED_JOB_STATUSES: &str =
    "'pending', 'running', 'paused', 'pause-requested', 'reverting', 'cancel-requested'";

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Renders `value` as a single-quoted SQL string literal.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Returns the `external://name` URI literal for a connection.
fn external_uri(connection: &Ident) -> String {
    quote_literal(&format!("external://{connection}"))
}

// ============================================================================
// SECTION: Databases and Tables
// ============================================================================

/// `CREATE DATABASE IF NOT EXISTS`.
#[must_use]
pub fn create_database(database: &Database) -> String {
    format!("CREATE DATABASE IF NOT EXISTS {database}")
}

/// `DROP DATABASE IF EXISTS ... CASCADE`.
#[must_use]
pub fn drop_database(database: &Database) -> String {
    format!("DROP DATABASE IF EXISTS {database} CASCADE")
}

/// Key/value table with a generated primary key default.
#[must_use]
pub fn create_table(table: &KvTable) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (k STRING DEFAULT gen_random_uuid()::STRING PRIMARY \
         KEY, v STRING)"
    )
}

/// `DROP TABLE IF EXISTS`.
#[must_use]
pub fn drop_table(table: &KvTable) -> String {
    format!("DROP TABLE IF EXISTS {table}")
}

/// Insert with `$1` key and `$2` value.
#[must_use]
pub fn insert_row(table: &KvTable) -> String {
    format!("INSERT INTO {table} (k, v) VALUES ($1, $2)")
}

/// Upsert with `$1` key and `$2` value.
#[must_use]
pub fn upsert_row(table: &KvTable) -> String {
    format!("UPSERT INTO {table} (k, v) VALUES ($1, $2)")
}

/// Reads every row for client-side fingerprinting.
#[must_use]
pub fn select_rows(table: &KvTable) -> String {
    format!("SELECT k, v FROM {table}")
}

// ============================================================================
// SECTION: Backup and Restore
// ============================================================================

/// Full backups start a collection; incremental ones append to the latest.
#[must_use]
pub fn backup_table(table: &KvTable, connection: &Ident, kind: BackupKind) -> String {
    let target = match kind {
        BackupKind::Full => "",
        BackupKind::Incremental => "LATEST IN ",
    };
    format!("BACKUP TABLE {table} INTO {target}{}", external_uri(connection))
}

/// Restores `source` from one collection into the database of `target`.
#[must_use]
pub fn restore_table(
    target: &KvTable,
    source: &KvTable,
    connection: &Ident,
    collection: &str,
) -> String {
    format!(
        "RESTORE TABLE {source} FROM {} IN {} WITH into_db = {}",
        quote_literal(collection),
        external_uri(connection),
        quote_literal(target.database.name.as_str()),
    )
}

/// Lists backup collections behind a connection.
#[must_use]
pub fn show_backups(connection: &Ident) -> String {
    format!("SHOW BACKUPS IN {}", external_uri(connection))
}

/// Backup entries for one table in a collection, newest first.
#[must_use]
pub fn backup_info(connection: &Ident, collection: &str, table: &KvTable) -> String {
    format!(
        "SELECT backup_type, end_time::TIMESTAMPTZ, parent_schema_name, object_name FROM [SHOW \
         BACKUP {} IN {}] WHERE parent_schema_name = {} AND object_name = {} ORDER BY end_time \
         DESC",
        quote_literal(collection),
        external_uri(connection),
        quote_literal(table.schema.name.as_str()),
        quote_literal(table.name.as_str()),
    )
}

// ============================================================================
// SECTION: External Connections
// ============================================================================

/// Creates a named external connection.
#[must_use]
pub fn create_external_connection(name: &Ident, url: &str) -> String {
    format!("CREATE EXTERNAL CONNECTION {} AS {}", quote_literal(name.as_str()), quote_literal(url))
}

/// Looks up an external connection by name.
#[must_use]
pub fn find_external_connection(name: &Ident) -> String {
    format!(
        "SELECT connection_name FROM [SHOW EXTERNAL CONNECTIONS] WHERE connection_name = {}",
        quote_literal(name.as_str())
    )
}

/// Drops a named external connection.
#[must_use]
pub fn drop_external_connection(name: &Ident) -> String {
    format!("DROP EXTERNAL CONNECTION {}", quote_literal(name.as_str()))
}

/// Runs the per-node connectivity and throughput check.
#[must_use]
pub fn check_external_connection(name: &Ident) -> String {
    format!("CHECK EXTERNAL CONNECTION {}", external_uri(name))
}

// ============================================================================
// SECTION: Cluster Metadata
// ============================================================================

/// Server version banner.
pub const SELECT_VERSION: &str = "SELECT version()";

/// Unfinished backup or restore jobs whose description contains `$1`
/// verbatim.
#[must_use]
pub fn unfinished_jobs() -> String {
    format!(
        "SELECT job_id FROM [SHOW JOBS] WHERE job_type IN ({TRACKED_JOB_TYPES}) AND status IN \
         ({UNFINISHED_JOB_STATUSES}) AND strpos(description, $1) > 0"
    )
}

/// Substring searched for in job descriptions that mention `table`.
#[must_use]
pub fn job_description_needle(table: &KvTable) -> String {
    table.to_string()
}
