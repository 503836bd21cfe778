// crates/blobcheck-core/src/core/mod.rs
// ============================================================================
// Module: Blobcheck Core Types
// Description: Parameters, destinations, identifiers, and backup metadata.
// Purpose: Shared data model for discovery and validation.
// Dependencies: serde, sha2, time, url
// ============================================================================

//! ## Overview
//! Core types are plain data with validation at construction. They carry no
//! I/O; storage and database access go through [`crate::interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod backup;
pub mod destination;
pub mod fingerprint;
pub mod identifiers;
pub mod params;
pub mod report;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use backup::BackupKind;
pub use backup::NodeStats;
pub use backup::ServerVersion;
pub use backup::TableBackup;
pub use destination::Destination;
pub use fingerprint::fingerprint_rows;
pub use identifiers::Database;
pub use identifiers::Ident;
pub use identifiers::IdentError;
pub use identifiers::KvTable;
pub use identifiers::Schema;
pub use params::DEFAULT_REGION;
pub use params::OBFUSCATED;
pub use params::ParamError;
pub use params::ParamKey;
pub use params::ParameterSet;
pub use report::Integrity;
pub use report::Report;
