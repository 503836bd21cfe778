// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed.
//!
//! When `BLOBCHECK_SYSTEM_S3_ENDPOINT` is unset a MinIO container is started;
//! when `BLOBCHECK_SYSTEM_DB_URL` is unset a CockroachDB container is started.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Per-test timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Existing database URL; skips the CockroachDB container.
    DatabaseUrl,
    /// Existing S3 endpoint reachable from the test process.
    S3Endpoint,
    /// S3 endpoint as seen from the database nodes, when it differs.
    S3ClusterEndpoint,
    /// Bucket on the existing S3 endpoint.
    S3Bucket,
    /// Access key for the existing S3 endpoint.
    S3AccessKey,
    /// Secret key for the existing S3 endpoint.
    S3SecretKey,
    /// Region for the existing S3 endpoint.
    S3Region,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DatabaseUrl => "BLOBCHECK_SYSTEM_DB_URL",
            Self::S3Endpoint => "BLOBCHECK_SYSTEM_S3_ENDPOINT",
            Self::S3ClusterEndpoint => "BLOBCHECK_SYSTEM_S3_CLUSTER_ENDPOINT",
            Self::S3Bucket => "BLOBCHECK_SYSTEM_S3_BUCKET",
            Self::S3AccessKey => "BLOBCHECK_SYSTEM_S3_ACCESS_KEY",
            Self::S3SecretKey => "BLOBCHECK_SYSTEM_S3_SECRET_KEY",
            Self::S3Region => "BLOBCHECK_SYSTEM_S3_REGION",
            Self::TimeoutSeconds => "BLOBCHECK_SYSTEM_TIMEOUT_SEC",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Existing object storage supplied through the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalS3 {
    /// Endpoint reachable from the test process.
    pub endpoint: String,
    /// Endpoint reachable from database nodes.
    pub cluster_endpoint: String,
    /// Bucket used for all runs.
    pub bucket: String,
    /// Access key id.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
    /// Bucket region.
    pub region: String,
}

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional existing database URL.
    pub database_url: Option<String>,
    /// Optional existing object storage.
    pub s3: Option<ExternalS3>,
    /// Optional timeout override in seconds (positive integer).
    pub timeout: Option<Duration>,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation.
    pub fn load() -> Result<Self, String> {
        Self::from_lookup(read_env_strict)
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error when a value is empty, the timeout is invalid, or an
    /// S3 endpoint is given without its bucket.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Result<Option<String>, String>,
    {
        let read = |key: SystemTestEnv| read_nonempty(&lookup, key.as_str());
        let database_url = read(SystemTestEnv::DatabaseUrl)?;
        let timeout = read(SystemTestEnv::TimeoutSeconds)?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let s3 = match read(SystemTestEnv::S3Endpoint)? {
            None => None,
            Some(endpoint) => {
                let bucket = read(SystemTestEnv::S3Bucket)?.ok_or_else(|| {
                    format!(
                        "{} is required with {}",
                        SystemTestEnv::S3Bucket.as_str(),
                        SystemTestEnv::S3Endpoint.as_str()
                    )
                })?;
                Some(ExternalS3 {
                    cluster_endpoint: read(SystemTestEnv::S3ClusterEndpoint)?
                        .unwrap_or_else(|| endpoint.clone()),
                    endpoint,
                    bucket,
                    access_key: read(SystemTestEnv::S3AccessKey)?
                        .unwrap_or_else(|| "minioadmin".to_string()),
                    secret_key: read(SystemTestEnv::S3SecretKey)?
                        .unwrap_or_else(|| "minioadmin".to_string()),
                    region: read(SystemTestEnv::S3Region)?
                        .unwrap_or_else(|| "us-east-1".to_string()),
                })
            }
        };
        Ok(Self {
            database_url,
            s3,
            timeout,
        })
    }

    /// Returns the configured timeout or [`DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads a variable through `lookup` and rejects empty values.
fn read_nonempty<F>(lookup: &F, name: &str) -> Result<Option<String>, String>
where
    F: Fn(&str) -> Result<Option<String>, String>,
{
    match lookup(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}
