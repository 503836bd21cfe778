// crates/blobcheck-store-s3/src/lib.rs
// ============================================================================
// Module: Blobcheck S3 Store
// Description: aws-sdk-s3 implementation of the object storage interfaces.
// Purpose: Probe S3-compatible providers with per-candidate client settings.
// Dependencies: aws-config, aws-sdk-s3, aws-smithy-runtime-api, reqwest, tokio
// ============================================================================

//! ## Overview
//! [`S3Connector`] turns each candidate [`blobcheck_core::Destination`] into
//! a dedicated S3 client. Every client honors the candidate's endpoint,
//! region, credentials, path-style, checksum, and TLS settings, and makes a
//! single attempt per request so discovery, not the SDK, decides what to
//! retry.
//!
//! The SDK is async; calls are driven by a Tokio runtime owned by the
//! connector. Callers must not invoke the store from inside another runtime's
//! async context.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod insecure;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::S3Connector;
pub use store::S3ObjectStore;
