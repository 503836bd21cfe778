// system-tests/src/lib.rs
// ============================================================================
// Module: Blobcheck System Tests Library
// Description: Shared configuration for system test scenarios.
// Purpose: Provide common utilities for blobcheck system-test binaries.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the blobcheck system-tests
//! binaries in `system-tests/tests`. Tests start MinIO and CockroachDB
//! containers unless the environment points at existing services.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
