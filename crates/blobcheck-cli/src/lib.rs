// crates/blobcheck-cli/src/lib.rs
// ============================================================================
// Module: Blobcheck CLI Library
// Description: Shared helpers for the blobcheck binary.
// Purpose: Keep logging setup and report rendering testable outside main.
// Dependencies: blobcheck-core, comfy-table, tracing-subscriber
// ============================================================================

//! ## Overview
//! Helpers used by the `blobcheck` binary. Logs go to stderr; the rendered
//! report is the only thing written to stdout.

pub mod logging;
pub mod report;
