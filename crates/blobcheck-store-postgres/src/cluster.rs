// crates/blobcheck-store-postgres/src/cluster.rs
// ============================================================================
// Module: Postgres Cluster
// Description: Pooled CockroachDB client implementing the database interface.
// Purpose: Issue table, backup, restore, and connection statements.
// Dependencies: blobcheck-core, postgres, r2d2, r2d2_postgres, tracing
// ============================================================================

//! ## Overview
//! Pooled CockroachDB client implementing the database interface: issues
//! table, backup, restore, and connection statements.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use blobcheck_core::BackupKind;
use blobcheck_core::Cluster;
use blobcheck_core::ClusterError;
use blobcheck_core::Database;
use blobcheck_core::Ident;
use blobcheck_core::KvTable;
use blobcheck_core::NodeStats;
use blobcheck_core::ServerVersion;
use blobcheck_core::TableBackup;
use blobcheck_core::fingerprint_rows;
use postgres::NoTls;
use postgres::Row;
use r2d2::Pool;
use r2d2::PooledConnection;
use r2d2_postgres::PostgresConnectionManager;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;
use tracing::info;

use crate::statements;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Pooled cluster client configuration.
#[derive(Debug, Clone)]
pub struct PostgresClusterConfig {
    /// Connection URL.
    pub url: String,
    /// Maximum pool size.
    pub max_connections: u32,
    /// Timeout for establishing or checking out a connection.
    pub connect_timeout: Duration,
}

impl PostgresClusterConfig {
    /// Builds a configuration with the default connect timeout.
    #[must_use]
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Cluster client construction errors.
#[derive(Debug, Error)]
pub enum PostgresClusterError {
    /// The connection URL could not be parsed.
    #[error("invalid database url: {0}")]
    InvalidUrl(String),
    /// The pool could not open its initial connections.
    #[error("database connection failed: {0}")]
    Connect(String),
}

// ============================================================================
// SECTION: Cluster
// ============================================================================

/// Pooled connection type.
type Connection = PooledConnection<PostgresConnectionManager<NoTls>>;

/// CockroachDB client over a bounded connection pool.
pub struct PostgresCluster {
    /// Connection pool; taken on drop.
    pool: Option<Pool<PostgresConnectionManager<NoTls>>>,
}

impl Drop for PostgresCluster {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            let _ = std::thread::spawn(move || drop(pool));
        }
    }
}

impl PostgresCluster {
    /// Connects to the cluster.
    ///
    /// # Errors
    ///
    /// Returns [`PostgresClusterError`] when the URL is invalid or the
    /// cluster cannot be reached.
    pub fn connect(config: &PostgresClusterConfig) -> Result<Self, PostgresClusterError> {
        let mut pg_config = config
            .url
            .parse::<postgres::Config>()
            .map_err(|err| PostgresClusterError::InvalidUrl(err.to_string()))?;
        pg_config.connect_timeout(config.connect_timeout);
        let manager = PostgresConnectionManager::new(pg_config, NoTls);
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(config.connect_timeout)
            .build(manager)
            .map_err(|err| PostgresClusterError::Connect(err.to_string()))?;
        Ok(Self {
            pool: Some(pool),
        })
    }

    /// Checks a connection out of the pool.
    fn conn(&self) -> Result<Connection, ClusterError> {
        self.pool
            .as_ref()
            .ok_or_else(|| ClusterError::Connection("cluster client closed".to_string()))?
            .get()
            .map_err(|err| ClusterError::Connection(err.to_string()))
    }

    /// Executes a statement that returns no rows.
    fn execute(&self, statement: &str) -> Result<(), ClusterError> {
        debug!(statement, "executing statement");
        self.conn()?.batch_execute(statement).map_err(query_error)
    }

    /// Runs a query with no parameters.
    fn query(&self, statement: &str) -> Result<Vec<Row>, ClusterError> {
        debug!(statement, "running query");
        self.conn()?.query(statement, &[]).map_err(query_error)
    }
}

impl Cluster for PostgresCluster {
    fn create_database(&self, database: &Database) -> Result<(), ClusterError> {
        self.execute(&statements::create_database(database))
    }

    fn drop_database(&self, database: &Database) -> Result<(), ClusterError> {
        info!(database = %database, "dropping database");
        self.execute(&statements::drop_database(database))
    }

    fn create_table(&self, table: &KvTable) -> Result<(), ClusterError> {
        self.execute(&statements::create_table(table))
    }

    fn drop_table(&self, table: &KvTable) -> Result<(), ClusterError> {
        info!(table = %table, "dropping table");
        self.execute(&statements::drop_table(table))
    }

    fn insert(&self, table: &KvTable, key: &str, value: &str) -> Result<(), ClusterError> {
        self.conn()?
            .execute(statements::insert_row(table).as_str(), &[&key, &value])
            .map(|_| ())
            .map_err(query_error)
    }

    fn upsert(&self, table: &KvTable, key: &str, value: &str) -> Result<(), ClusterError> {
        self.conn()?
            .execute(statements::upsert_row(table).as_str(), &[&key, &value])
            .map(|_| ())
            .map_err(query_error)
    }

    fn fingerprint(&self, table: &KvTable) -> Result<String, ClusterError> {
        let rows = self.query(&statements::select_rows(table))?;
        let mut pairs = Vec::with_capacity(rows.len());
        for row in &rows {
            let key: &str = row.try_get(0).map_err(invalid_row)?;
            let value: Option<&str> = row.try_get(1).map_err(invalid_row)?;
            pairs.push((key, value));
        }
        Ok(fingerprint_rows(pairs))
    }

    fn backup(
        &self,
        table: &KvTable,
        connection: &Ident,
        kind: BackupKind,
    ) -> Result<(), ClusterError> {
        info!(table = %table, kind = %kind, "starting backup");
        // BACKUP returns a job summary row; the result is not needed.
        self.query(&statements::backup_table(table, connection, kind)).map(|_| ())
    }

    fn restore(
        &self,
        target: &KvTable,
        source: &KvTable,
        connection: &Ident,
        collection: &str,
    ) -> Result<(), ClusterError> {
        info!(source = %source, target = %target, collection, "starting restore");
        self.query(&statements::restore_table(target, source, connection, collection)).map(|_| ())
    }

    fn create_external_connection(&self, name: &Ident, url: &str) -> Result<(), ClusterError> {
        self.execute(&statements::create_external_connection(name, url))
    }

    fn external_connection_exists(&self, name: &Ident) -> Result<bool, ClusterError> {
        let rows = self.query(&statements::find_external_connection(name))?;
        Ok(!rows.is_empty())
    }

    fn drop_external_connection(&self, name: &Ident) -> Result<(), ClusterError> {
        self.execute(&statements::drop_external_connection(name))
    }

    fn list_backup_collections(&self, connection: &Ident) -> Result<Vec<String>, ClusterError> {
        let rows = self.query(&statements::show_backups(connection))?;
        rows.iter().map(|row| row.try_get::<_, String>(0).map_err(invalid_row)).collect()
    }

    fn backup_info(
        &self,
        connection: &Ident,
        collection: &str,
        table: &KvTable,
    ) -> Result<Vec<TableBackup>, ClusterError> {
        let rows = self.query(&statements::backup_info(connection, collection, table))?;
        let mut backups = Vec::with_capacity(rows.len());
        for row in &rows {
            let label: String = row.try_get(0).map_err(invalid_row)?;
            let end_time: OffsetDateTime = row.try_get(1).map_err(invalid_row)?;
            let kind = BackupKind::from_label(&label);
            debug!(table = %table, kind = %kind, %end_time, "backup entry");
            backups.push(TableBackup {
                table: table.clone(),
                kind,
                end_time,
            });
        }
        Ok(backups)
    }

    fn check_external_connection(
        &self,
        connection: &Ident,
    ) -> Result<Vec<NodeStats>, ClusterError> {
        let rows = self.query(&statements::check_external_connection(connection))?;
        rows.iter().map(node_stats).collect()
    }

    fn server_version(&self) -> Result<ServerVersion, ClusterError> {
        let rows = self.query(statements::SELECT_VERSION)?;
        let banner: String = rows
            .first()
            .ok_or_else(|| ClusterError::Invalid("version() returned no rows".to_string()))?
            .try_get(0)
            .map_err(invalid_row)?;
        ServerVersion::parse_banner(&banner)
            .ok_or_else(|| ClusterError::Invalid(format!("unrecognized version banner {banner:?}")))
    }

    fn unfinished_jobs(&self, table: &KvTable) -> Result<Vec<i64>, ClusterError> {
        let needle = statements::job_description_needle(table);
        let rows = self
            .conn()?
            .query(statements::unfinished_jobs().as_str(), &[&needle])
            .map_err(query_error)?;
        rows.iter().map(|row| row.try_get::<_, i64>(0).map_err(invalid_row)).collect()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a statement failure.
fn query_error(err: postgres::Error) -> ClusterError {
    let message = err.as_db_error().map_or_else(|| err.to_string(), |db| db.message().to_string());
    ClusterError::Query(message)
}

/// Maps a column decoding failure.
fn invalid_row(err: postgres::Error) -> ClusterError {
    ClusterError::Invalid(err.to_string())
}

/// Decodes one `CHECK EXTERNAL CONNECTION` row.
fn node_stats(row: &Row) -> Result<NodeStats, ClusterError> {
    let text = |index: usize| -> Result<String, ClusterError> {
        let value: Option<String> = row.try_get(index).map_err(invalid_row)?;
        Ok(value.unwrap_or_default())
    };
    Ok(NodeStats {
        node: row.try_get(0).map_err(invalid_row)?,
        locality: text(1)?,
        success: row.try_get(2).map_err(invalid_row)?,
        error: text(3)?,
        transferred: text(4)?,
        read_speed: text(5)?,
        write_speed: text(6)?,
        can_delete: row.try_get(7).map_err(invalid_row)?,
    })
}
