// crates/blobcheck-config/src/lib.rs
// ============================================================================
// Module: Blobcheck Config Library
// Description: Run configuration, config file loading, and destination setup.
// Purpose: Turn operator input into a validated run configuration.
// Dependencies: blobcheck-core, serde, toml, url, uuid
// ============================================================================

//! ## Overview
//! `blobcheck-config` owns everything between operator input and the first
//! network call: the [`CheckConfig`] model, optional TOML loading with hard
//! size limits, cross-field validation, and resolution of credentials and
//! the storage location into a base [`blobcheck_core::Destination`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod destination;
pub mod duration;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use destination::*;
pub use duration::parse_duration;
