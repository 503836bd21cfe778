// crates/blobcheck-core/src/interfaces/mod.rs
// ============================================================================
// Module: Blobcheck Interfaces
// Description: Backend-agnostic interfaces for object storage and the database.
// Purpose: Define the collaborator surfaces used by discovery and validation.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Discovery and validation never talk to a storage client or SQL driver
//! directly. They consume the narrow traits below, which the
//! `blobcheck-store-s3` and `blobcheck-store-postgres` crates implement and
//! tests replace with in-memory fakes.
//!
//! All methods are blocking. Callers that run inside an async runtime issue
//! them from blocking worker threads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::core::BackupKind;
use crate::core::Database;
use crate::core::Destination;
use crate::core::Ident;
use crate::core::KvTable;
use crate::core::NodeStats;
use crate::core::ServerVersion;
use crate::core::TableBackup;

// ============================================================================
// SECTION: Object Storage
// ============================================================================

/// Object storage operation labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOperation {
    /// List objects in a bucket.
    List,
    /// Write an object.
    Put,
    /// Read an object.
    Get,
    /// Delete an object.
    Delete,
}

impl fmt::Display for StorageOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::List => "list objects",
            Self::Put => "put object",
            Self::Get => "get object",
            Self::Delete => "delete object",
        };
        f.write_str(label)
    }
}

/// Object storage errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The client could not be built for the candidate parameters.
    #[error("storage client setup failed: {0}")]
    Client(String),
    /// A request against the bucket failed.
    #[error("{operation} failed: {message}")]
    Request {
        /// Failed operation.
        operation: StorageOperation,
        /// Provider or transport error text.
        message: String,
    },
}

impl StorageError {
    /// Builds a request error for `operation`.
    #[must_use]
    pub fn request(operation: StorageOperation, message: impl fmt::Display) -> Self {
        Self::Request {
            operation,
            message: message.to_string(),
        }
    }
}

/// Object storage client bound to one set of connection parameters.
pub trait ObjectStore {
    /// Lists object keys in `bucket`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the bucket is unreachable or access is denied.
    fn list(&self, bucket: &str) -> Result<Vec<String>, StorageError>;

    /// Writes `body` to `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the write is rejected.
    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StorageError>;

    /// Reads the full body of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the object cannot be read.
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Deletes `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the delete is rejected.
    fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError>;
}

/// Builds object storage clients for candidate destinations.
pub trait ObjectStoreConnector {
    /// Builds a client honoring the destination's parameters, with retries
    /// limited to a single attempt per request.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Client`] when the parameters cannot be applied.
    fn connect(&self, destination: &Destination) -> Result<Box<dyn ObjectStore>, StorageError>;
}

// ============================================================================
// SECTION: Database
// ============================================================================

/// Database errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    /// No connection could be acquired.
    #[error("database connection failed: {0}")]
    Connection(String),
    /// A statement failed.
    #[error("database query failed: {0}")]
    Query(String),
    /// A result row could not be interpreted.
    #[error("unexpected database response: {0}")]
    Invalid(String),
}

/// Database capabilities consumed by validation.
///
/// Implementations acquire a pooled connection per call and release it on
/// every exit path, so one instance is shared by concurrent tasks.
pub trait Cluster: Send + Sync {
    /// Creates a database if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the statement fails.
    fn create_database(&self, database: &Database) -> Result<(), ClusterError>;

    /// Drops a database and its contents if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the statement fails.
    fn drop_database(&self, database: &Database) -> Result<(), ClusterError>;

    /// Creates a key/value table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the statement fails.
    fn create_table(&self, table: &KvTable) -> Result<(), ClusterError>;

    /// Drops a table if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the statement fails.
    fn drop_table(&self, table: &KvTable) -> Result<(), ClusterError>;

    /// Inserts a row; fails when the key already exists.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the statement fails.
    fn insert(&self, table: &KvTable, key: &str, value: &str) -> Result<(), ClusterError>;

    /// Inserts or replaces a row.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the statement fails.
    fn upsert(&self, table: &KvTable, key: &str, value: &str) -> Result<(), ClusterError>;

    /// Returns an order-independent digest of all rows.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the table cannot be read.
    fn fingerprint(&self, table: &KvTable) -> Result<String, ClusterError>;

    /// Backs `table` up through the named external connection. Full backups
    /// start a new collection; incremental backups extend the latest one.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the backup job fails.
    fn backup(&self, table: &KvTable, connection: &Ident, kind: BackupKind)
    -> Result<(), ClusterError>;

    /// Restores `source` from `collection` into the database of `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the restore job fails.
    fn restore(
        &self,
        target: &KvTable,
        source: &KvTable,
        connection: &Ident,
        collection: &str,
    ) -> Result<(), ClusterError>;

    /// Creates a named external connection pointing at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the connection is rejected.
    fn create_external_connection(&self, name: &Ident, url: &str) -> Result<(), ClusterError>;

    /// Returns true when the named external connection exists.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the lookup fails.
    fn external_connection_exists(&self, name: &Ident) -> Result<bool, ClusterError>;

    /// Drops the named external connection.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the statement fails.
    fn drop_external_connection(&self, name: &Ident) -> Result<(), ClusterError>;

    /// Lists backup collections stored behind the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the listing fails.
    fn list_backup_collections(&self, connection: &Ident) -> Result<Vec<String>, ClusterError>;

    /// Returns backup entries for `table` in `collection`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the metadata cannot be read.
    fn backup_info(
        &self,
        connection: &Ident,
        collection: &str,
        table: &KvTable,
    ) -> Result<Vec<TableBackup>, ClusterError>;

    /// Runs a connectivity and throughput check through the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the check cannot run.
    fn check_external_connection(&self, connection: &Ident)
    -> Result<Vec<NodeStats>, ClusterError>;

    /// Returns the server release version.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the version cannot be read or parsed.
    fn server_version(&self) -> Result<ServerVersion, ClusterError>;

    /// Returns ids of backup or restore jobs touching `table` that have not
    /// finished.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the job listing fails.
    fn unfinished_jobs(&self, table: &KvTable) -> Result<Vec<i64>, ClusterError>;
}
