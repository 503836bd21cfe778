// crates/blobcheck-store-postgres/src/lib.rs
// ============================================================================
// Module: Blobcheck Postgres Store
// Description: CockroachDB access over the Postgres wire protocol.
// Purpose: Implement the database interface with a pooled postgres client.
// Dependencies: blobcheck-core, postgres, r2d2, r2d2_postgres
// ============================================================================

//! ## Overview
//! [`PostgresCluster`] implements [`blobcheck_core::Cluster`] against a
//! CockroachDB cluster. Each call checks a connection out of an r2d2 pool and
//! returns it when the call completes, so one cluster handle is shared by
//! every concurrent workload task. Statement text is built in
//! [`statements`] from validated identifiers.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cluster;
pub mod statements;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cluster::PostgresCluster;
pub use cluster::PostgresClusterConfig;
pub use cluster::PostgresClusterError;
