// crates/blobcheck-cli/src/main.rs
// ============================================================================
// Module: Blobcheck CLI Entry Point
// Description: Command dispatcher for storage discovery and backup validation.
// Purpose: Wire configuration, discovery, validation, and report output.
// Dependencies: blobcheck-config, blobcheck-core, blobcheck-store-*, clap, tokio
// ============================================================================

//! ## Overview
//! `blobcheck s3` discovers working S3 parameters for the configured
//! destination, then runs a full backup and restore cycle through the
//! database and prints the suggested parameters and per-node statistics.
//! With `--guess` only discovery runs and no database is contacted.
//!
//! Ctrl-C cancels the run; teardown still happens and no report is printed.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use blobcheck_cli::logging::init_logging;
use blobcheck_cli::report::render;
use blobcheck_config::CheckConfig;
use blobcheck_config::parse_duration;
use blobcheck_config::resolve_destination;
use blobcheck_core::Cluster;
use blobcheck_core::Destination;
use blobcheck_core::Report;
use blobcheck_core::discover;
use blobcheck_store_postgres::PostgresCluster;
use blobcheck_store_postgres::PostgresClusterConfig;
use blobcheck_store_s3::S3Connector;
use blobcheck_validate::RunOutcome;
use blobcheck_validate::Validator;
use blobcheck_validate::ValidatorOptions;
use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "blobcheck",
    version,
    about = "blobcheck validates backup/restore operation against blob storage"
)]
struct Cli {
    /// Shared run settings.
    #[command(flatten)]
    run: RunArgs,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Perform validation of an S3 object store.
    S3,
}

/// Settings shared by every subcommand. Flags override the config file.
#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Optional TOML config file (falls back to `BLOBCHECK_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Database connection URL.
    #[arg(long, value_name = "URL", global = true)]
    db: Option<String>,
    /// Destination path (bucket/folder).
    #[arg(long, value_name = "PATH", global = true)]
    path: Option<String>,
    /// HTTP endpoint of the storage provider.
    #[arg(long, value_name = "URL", global = true)]
    endpoint: Option<String>,
    /// Full S3 URI with parameters; excludes endpoint and path.
    #[arg(long, value_name = "URI", global = true)]
    uri: Option<String>,
    /// Only discover working parameters; skip the backup/restore cycle.
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    guess: bool,
    /// Increase logging verbosity (-v debug, -vv trace).
    #[arg(short = 'v', long = "verbosity", action = ArgAction::Count, global = true)]
    verbosity: u8,
    /// Number of concurrent workers during the full backup.
    #[arg(long, value_name = "N", global = true)]
    workers: Option<usize>,
    /// Duration of each workload burst (e.g. `5s`, `500ms`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration, global = true)]
    workload_duration: Option<Duration>,
}

impl RunArgs {
    /// Applies explicit flags on top of `config`.
    fn apply(&self, config: &mut CheckConfig) {
        if let Some(db) = &self.db {
            config.db.clone_from(db);
        }
        if let Some(path) = &self.path {
            config.path = Some(path.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(uri) = &self.uri {
            config.uri = Some(uri.clone());
        }
        if self.guess {
            config.guess = true;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(duration) = self.workload_duration {
            config.workload_duration = duration;
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    fn new(message: impl ToString) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Exit code used when the run is interrupted.
const INTERRUPTED: u8 = 130;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the selected command.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.run.verbosity).map_err(CliError::new)?;
    let config = load_config(&cli.run)?;
    match cli.command {
        Commands::S3 => command_s3(config).await,
    }
}

/// Loads the config file and applies flag overrides.
fn load_config(args: &RunArgs) -> CliResult<CheckConfig> {
    let mut config = CheckConfig::load(args.config.as_deref()).map_err(CliError::new)?;
    args.apply(&mut config);
    config.validate().map_err(CliError::new)?;
    Ok(config)
}

/// Runs discovery and, unless guessing, the full validation.
async fn command_s3(config: CheckConfig) -> CliResult<ExitCode> {
    let base = resolve_destination(&config).map_err(CliError::new)?;
    let stop = CancellationToken::new();
    watch_interrupt(stop.clone());

    let Some(destination) = discover_destination(base, &stop).await? else {
        return Ok(ExitCode::from(INTERRUPTED));
    };
    if config.guess {
        write_report(&Report::suggestion(destination.params()))?;
        return Ok(ExitCode::SUCCESS);
    }

    let cluster = connect_cluster(&config).await?;
    let options = ValidatorOptions {
        workers: config.workers,
        workload_duration: config.workload_duration,
    };
    let validator = Validator::new(cluster, destination, options).map_err(CliError::new)?;
    let outcome = validator.run(&stop).await;
    let teardown = validator.clean().await;
    if let Err(err) = &teardown {
        error!(error = %err, "teardown incomplete");
    }

    let code = match outcome.map_err(CliError::new)? {
        RunOutcome::Completed(report) => {
            write_report(&report)?;
            ExitCode::SUCCESS
        }
        RunOutcome::Cancelled => {
            warn!("validation interrupted");
            ExitCode::from(INTERRUPTED)
        }
    };
    teardown.map_err(CliError::new)?;
    Ok(code)
}

/// Cancels `stop` on Ctrl-C.
fn watch_interrupt(stop: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping");
            stop.cancel();
        }
    });
}

/// Runs discovery on the blocking pool. `None` means interrupted.
async fn discover_destination(
    base: Destination,
    stop: &CancellationToken,
) -> CliResult<Option<Destination>> {
    info!(destination = %base, "discovering storage parameters");
    let search = tokio::task::spawn_blocking(move || {
        let connector = S3Connector::new().map_err(CliError::new)?;
        discover(&connector, base).map_err(CliError::new)
    });
    tokio::select! {
        () = stop.cancelled() => Ok(None),
        joined = search => match joined {
            Ok(result) => result.map(Some),
            Err(err) => Err(CliError::new(err)),
        },
    }
}

/// Opens the database connection pool.
async fn connect_cluster(config: &CheckConfig) -> CliResult<Arc<dyn Cluster>> {
    let pool_config = PostgresClusterConfig::new(config.db.clone(), config.max_connections);
    let joined = tokio::task::spawn_blocking(move || PostgresCluster::connect(&pool_config)).await;
    let cluster = joined.map_err(CliError::new)?.map_err(CliError::new)?;
    Ok(Arc::new(cluster))
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes the rendered report to stdout.
fn write_report(report: &Report) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    stdout
        .write_all(render(report).as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
