// crates/blobcheck-config/src/destination.rs
// ============================================================================
// Module: Destination Resolution
// Description: Builds the base storage destination from config and credentials.
// Purpose: Fail on missing credentials before any network activity.
// Dependencies: blobcheck-core, tracing, url, uuid
// ============================================================================

//! ## Overview
//! The base destination is assembled from three sources, later ones winning:
//! 1. credentials from the environment (`AWS_ACCESS_KEY_ID`,
//!    `AWS_SECRET_ACCESS_KEY`, optional `AWS_SESSION_TOKEN` and `AWS_REGION`),
//! 2. the configured endpoint and path,
//! 3. query parameters of an `s3://` URI, when one is given.
//!
//! The access key and secret must be present once all sources are merged.
//! A fresh run id is appended to the path so backup collections from earlier
//! runs are never visible to this one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;

use blobcheck_core::DEFAULT_REGION;
use blobcheck_core::Destination;
use blobcheck_core::ParamKey;
use blobcheck_core::ParameterSet;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::config::CheckConfig;
use crate::config::ConfigError;
use crate::config::non_blank;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Required credential parameters.
const REQUIRED_CREDENTIALS: [ParamKey; 2] = [ParamKey::AccessKeyId, ParamKey::SecretAccessKey];

/// Optional parameters read from the environment.
const OPTIONAL_ENVIRONMENT: [ParamKey; 2] = [ParamKey::SessionToken, ParamKey::Region];

/// URI scheme accepted for storage locations.
const S3_SCHEME: &str = "s3";

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves the base destination using the process environment and a random
/// run id.
///
/// # Errors
///
/// Returns [`ConfigError`] as described on [`resolve_destination_with`].
pub fn resolve_destination(config: &CheckConfig) -> Result<Destination, ConfigError> {
    let run_id = Uuid::new_v4().to_string();
    resolve_destination_with(config, |name| env::var(name).ok(), &run_id)
}

/// Resolves the base destination with an explicit variable lookup and run id.
///
/// # Errors
///
/// Returns [`ConfigError::MissingCredential`] when the access key or secret
/// is absent, [`ConfigError::InvalidUri`] for malformed URIs, and
/// [`ConfigError::InvalidParameter`] for unrecognized URI query keys.
pub fn resolve_destination_with<F>(
    config: &CheckConfig,
    lookup: F,
    run_id: &str,
) -> Result<Destination, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut params = ParameterSet::new();
    for key in REQUIRED_CREDENTIALS.iter().chain(OPTIONAL_ENVIRONMENT.iter()) {
        if let Some(value) = lookup(key.as_str()).filter(|value| !value.trim().is_empty()) {
            debug!(param = %key, "read from environment");
            params.insert(*key, value);
        }
    }

    let location = if let Some(uri) = non_blank(config.uri.as_deref()) {
        parse_uri(uri, &mut params)?
    } else {
        if let Some(endpoint) = non_blank(config.endpoint.as_deref()) {
            params.insert(ParamKey::Endpoint, endpoint);
        }
        non_blank(config.path.as_deref()).unwrap_or_default().to_string()
    };

    if REQUIRED_CREDENTIALS.iter().any(|key| !params.contains(*key)) {
        return Err(ConfigError::MissingCredential);
    }
    if !params.contains(ParamKey::Region) {
        debug!(region = DEFAULT_REGION, "no region given, using default");
        params.insert(ParamKey::Region, DEFAULT_REGION);
    }

    let destination = Destination::new(&format!("{location}/{run_id}"), params);
    if destination.prefix().is_none() {
        return Err(ConfigError::Invalid("destination path must name a bucket".to_string()));
    }
    debug!(
        destination = %destination,
        run_id,
        params = %destination.params().obfuscated(),
        "resolved base destination"
    );
    Ok(destination)
}

/// Splits an `s3://bucket/path?params` URI into a location and parameters.
fn parse_uri(uri: &str, params: &mut ParameterSet) -> Result<String, ConfigError> {
    let parsed = Url::parse(uri).map_err(|err| ConfigError::InvalidUri(err.to_string()))?;
    if parsed.scheme() != S3_SCHEME {
        return Err(ConfigError::InvalidUri(format!(
            "scheme must be {S3_SCHEME}, got {}",
            parsed.scheme()
        )));
    }
    let bucket = parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| ConfigError::InvalidUri("missing bucket".to_string()))?;
    for (key, value) in parsed.query_pairs() {
        params
            .set(&key, value.into_owned())
            .map_err(|_| ConfigError::InvalidParameter(key.into_owned()))?;
    }
    Ok(format!("{bucket}{}", parsed.path()))
}
