// crates/blobcheck-core/src/lib.rs
// ============================================================================
// Module: Blobcheck Core
// Description: Storage parameter model, collaborator interfaces, and discovery.
// Purpose: Backend-agnostic foundation shared by every blobcheck crate.
// Dependencies: serde, sha2, thiserror, time, tracing, url
// ============================================================================

//! ## Overview
//! `blobcheck-core` holds the data model for checking an S3-compatible
//! bucket as a backup destination, the blocking traits the storage and
//! database backends implement, and the discovery engine that searches for a
//! working parameter combination.
//!
//! Nothing in this crate performs I/O directly. Backends live in
//! `blobcheck-store-s3` and `blobcheck-store-postgres`.

pub mod core;
pub mod interfaces;
pub mod runtime;

pub use crate::core::*;
pub use crate::interfaces::*;
pub use crate::runtime::*;
