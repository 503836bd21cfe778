// crates/blobcheck-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for flag parsing and config overrides.
// Purpose: Ensure flags layer over config files the way operators expect.
// Dependencies: blobcheck-cli main helpers
// ============================================================================

//! ## Overview
//! Exercises `Cli` parsing and `RunArgs::apply`. Flags that are not given
//! must leave config file values untouched.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use blobcheck_config::CheckConfig;
use blobcheck_config::DEFAULT_DATABASE_URL;
use clap::Parser;

use super::Cli;
use super::Commands;
use super::RunArgs;

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn parses_endpoint_and_path_after_subcommand() {
    let cli = Cli::try_parse_from([
        "blobcheck",
        "s3",
        "--endpoint",
        "http://localhost:9000",
        "--path",
        "backups/run",
    ])
    .unwrap();

    assert_eq!(cli.command, Commands::S3);
    assert_eq!(cli.run.endpoint.as_deref(), Some("http://localhost:9000"));
    assert_eq!(cli.run.path.as_deref(), Some("backups/run"));
    assert!(!cli.run.guess);
}

#[test]
fn verbosity_counts_repeated_flags() {
    let cli = Cli::try_parse_from(["blobcheck", "-vv", "s3"]).unwrap();
    assert_eq!(cli.run.verbosity, 2);

    let cli = Cli::try_parse_from(["blobcheck", "s3"]).unwrap();
    assert_eq!(cli.run.verbosity, 0);
}

#[test]
fn workload_duration_accepts_human_units() {
    let cli =
        Cli::try_parse_from(["blobcheck", "s3", "--workload-duration", "250ms"]).unwrap();
    assert_eq!(cli.run.workload_duration, Some(Duration::from_millis(250)));
}

#[test]
fn workload_duration_rejects_unknown_unit() {
    let err = Cli::try_parse_from(["blobcheck", "s3", "--workload-duration", "5d"]).unwrap_err();
    assert!(err.to_string().contains("unit must be"));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["blobcheck", "--guess"]).is_err());
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

#[test]
fn absent_flags_keep_config_values() {
    let mut config = CheckConfig {
        endpoint: Some("http://minio:9000".to_string()),
        path: Some("bucket/dir".to_string()),
        workers: 9,
        ..CheckConfig::default()
    };
    let expected = config.clone();

    RunArgs::default().apply(&mut config);

    assert_eq!(config, expected);
    assert_eq!(config.db, DEFAULT_DATABASE_URL);
}

#[test]
fn explicit_flags_override_config_values() {
    let mut config = CheckConfig {
        endpoint: Some("http://minio:9000".to_string()),
        path: Some("bucket/dir".to_string()),
        ..CheckConfig::default()
    };
    let args = RunArgs {
        db: Some("postgresql://root@db:26257?sslmode=disable".to_string()),
        endpoint: Some("http://other:9000".to_string()),
        guess: true,
        workers: Some(2),
        workload_duration: Some(Duration::from_secs(1)),
        ..RunArgs::default()
    };

    args.apply(&mut config);

    assert_eq!(config.db, "postgresql://root@db:26257?sslmode=disable");
    assert_eq!(config.endpoint.as_deref(), Some("http://other:9000"));
    assert_eq!(config.path.as_deref(), Some("bucket/dir"));
    assert!(config.guess);
    assert_eq!(config.workers, 2);
    assert_eq!(config.workload_duration, Duration::from_secs(1));
}

#[test]
fn uri_flag_conflicts_with_configured_endpoint() {
    let mut config = CheckConfig {
        endpoint: Some("http://minio:9000".to_string()),
        path: Some("bucket/dir".to_string()),
        ..CheckConfig::default()
    };
    let args = RunArgs {
        uri: Some("s3://bucket/dir?AWS_REGION=us-east-1".to_string()),
        ..RunArgs::default()
    };

    args.apply(&mut config);

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("cannot be set simultaneously"));
}
