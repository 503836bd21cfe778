// crates/blobcheck-config/src/config.rs
// ============================================================================
// Module: Blobcheck Configuration
// Description: Run configuration model, loading, and validation.
// Purpose: Provide strict config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! A run is configured by [`CheckConfig`]. Values come from an optional TOML
//! file and are then overridden by explicit command-line flags. Validation
//! runs once all sources are merged, before any network activity.
//!
//! ```toml
//! db = "postgresql://root@localhost:26257?sslmode=disable"
//! endpoint = "https://minio.local:9000"
//! path = "backups/cluster-a"
//! workers = 5
//! workload_duration = "5s"
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV_VAR: &str = "BLOBCHECK_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default database connection URL.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://root@localhost:26257?sslmode=disable";
/// Default number of concurrent workload workers.
pub const DEFAULT_WORKERS: usize = 5;
/// Default workload duration.
pub const DEFAULT_WORKLOAD_DURATION: Duration = Duration::from_secs(5);
/// Default database connection pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Validated run configuration.
///
/// # Invariants
/// - After [`CheckConfig::validate`], exactly one of `uri` or
///   (`endpoint`, `path`) is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Database connection URL.
    pub db: String,
    /// Object storage endpoint URL.
    pub endpoint: Option<String>,
    /// Destination path, `bucket[/prefix]`.
    pub path: Option<String>,
    /// Full `s3://bucket/path?params` URI; replaces endpoint and path.
    pub uri: Option<String>,
    /// Run discovery only.
    pub guess: bool,
    /// Concurrent workload workers during the full backup.
    pub workers: usize,
    /// Length of each workload burst.
    #[serde(with = "crate::duration::human")]
    pub workload_duration: Duration,
    /// Maximum pooled database connections.
    pub max_connections: u32,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            db: DEFAULT_DATABASE_URL.to_string(),
            endpoint: None,
            path: None,
            uri: None,
            guess: false,
            workers: DEFAULT_WORKERS,
            workload_duration: DEFAULT_WORKLOAD_DURATION,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl CheckConfig {
    /// Loads configuration from `path`, from the file named by
    /// [`CONFIG_ENV_VAR`], or returns defaults when neither is given.
    ///
    /// The loaded values are not validated; callers merge flag overrides
    /// first and then call [`CheckConfig::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(resolved) = resolve_path(path)? else {
            return Ok(Self::default());
        };
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db.trim().is_empty() && !self.guess {
            return Err(ConfigError::Invalid("database URL cannot be blank".to_string()));
        }
        let endpoint = non_blank(self.endpoint.as_deref());
        let path = non_blank(self.path.as_deref());
        if non_blank(self.uri.as_deref()).is_some() {
            if endpoint.is_some() || path.is_some() {
                return Err(ConfigError::Invalid(
                    "URI and (endpoint + path) cannot be set simultaneously".to_string(),
                ));
            }
        } else if endpoint.is_none() || path.is_none() {
            return Err(ConfigError::Invalid("set (endpoint + path) or URI".to_string()));
        }
        if self.workload_duration.is_zero() {
            return Err(ConfigError::Invalid("workload duration must be positive".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid("max_connections must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Returns the trimmed value when it is non-empty.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading, validation, or resolution errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// A storage parameter name is not recognized.
    #[error("invalid param {0:?}")]
    InvalidParameter(String),
    /// Required credentials are absent.
    #[error("AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY must be set")]
    MissingCredential,
    /// The storage URI could not be interpreted.
    #[error("invalid storage uri: {0}")]
    InvalidUri(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the CLI or the environment.
fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    match env::var(CONFIG_ENV_VAR) {
        Ok(env_path) if env_path.len() > MAX_TOTAL_PATH_LENGTH => {
            Err(ConfigError::Invalid("config path exceeds max length".to_string()))
        }
        Ok(env_path) if !env_path.trim().is_empty() => Ok(Some(PathBuf::from(env_path))),
        _ => Ok(None),
    }
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}
