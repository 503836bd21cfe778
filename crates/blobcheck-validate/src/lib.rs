// crates/blobcheck-validate/src/lib.rs
// ============================================================================
// Module: Blobcheck Validate
// Description: Backup and restore validation against a discovered destination.
// Purpose: Drive workload, backups, restore, and integrity checks end to end.
// Dependencies: blobcheck-core, tokio, tokio-util, tracing, uuid
// ============================================================================

//! ## Overview
//! Validation takes a destination that already passed discovery and proves
//! the database can use it: the destination is registered as an external
//! connection, synthetic writes run while a full backup is taken, an
//! incremental backup follows, and the collection is restored into a
//! separate database whose fingerprint must match the source.
//!
//! Database calls are blocking and run on the blocking thread pool. The
//! orchestrator itself is async so workers and the backup can share one
//! cancellation scope.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod connection;
pub mod error;
mod task;
pub mod validator;
pub mod workload;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use connection::CONNECTION_NAME;
pub use connection::ExternalConnection;
pub use error::Phase;
pub use error::PhaseError;
pub use error::RunOutcome;
pub use error::TeardownError;
pub use error::TeardownFailure;
pub use error::ValidationError;
pub use validator::RESTORED_DATABASE;
pub use validator::SOURCE_DATABASE;
pub use validator::TABLE_NAME;
pub use validator::Validator;
pub use validator::ValidatorOptions;
pub use validator::check_backup_set;
pub use validator::single_collection;
pub use workload::THINK_TIME;
pub use workload::Workload;
