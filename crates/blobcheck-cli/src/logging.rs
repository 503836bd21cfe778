// crates/blobcheck-cli/src/logging.rs
// ============================================================================
// Module: Logging
// Description: tracing subscriber setup driven by the verbosity counter.
// Purpose: Route structured logs to stderr at the requested level.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! tracing subscriber setup driven by the verbosity counter; routes
//! structured logs to stderr at the requested level.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Filters
// ============================================================================

/// Storage and transport crates silenced below `-vv`.
const CLIENT_TARGETS: [&str; 7] = [
    "aws_config",
    "aws_sdk_s3",
    "aws_smithy_runtime",
    "hyper",
    "reqwest",
    "rustls",
    "tokio_postgres",
];

/// Returns the filter directive for a `-v` count.
///
/// 0 logs at `info`, 1 at `debug`, and 2 or more at `trace`. Client
/// libraries stay at `warn` until trace is requested.
#[must_use]
pub fn filter_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => return "trace".to_string(),
    };
    let mut directive = level.to_string();
    for target in CLIENT_TARGETS {
        directive.push_str(&format!(",{target}=warn"));
    }
    directive
}

// ============================================================================
// SECTION: Initialization
// ============================================================================

/// Logging setup errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A global subscriber was already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Installs the global subscriber. `RUST_LOG` overrides the verbosity.
///
/// # Errors
///
/// Returns [`LoggingError::Install`] when a subscriber is already set.
pub fn init_logging(verbosity: u8) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| LoggingError::Install(err.to_string()))
}
