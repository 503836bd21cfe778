// crates/blobcheck-core/src/core/params.rs
// ============================================================================
// Module: Storage Parameters
// Description: Recognized S3 connection parameters and the ordered parameter set.
// Purpose: Hold connection options with validation and secret obfuscation.
// Dependencies: serde, thiserror, url
// ============================================================================

//! ## Overview
//! A [`ParameterSet`] maps recognized parameter keys to string values. Keys
//! are drawn from the closed [`ParamKey`] set; anything else is rejected with
//! [`ParamError::InvalidParameter`]. Iteration is lexicographic by key name,
//! which keeps display output and the canonical URL deterministic.
//!
//! Secret values are only replaced by [`OBFUSCATED`] in the view returned by
//! [`ParameterSet::obfuscated`]; the set itself always holds real values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Marker rendered in place of sensitive parameter values.
pub const OBFUSCATED: &str = "******";

/// Region used when the caller supplies none.
pub const DEFAULT_REGION: &str = "aws-global";

// ============================================================================
// SECTION: Parameter Keys
// ============================================================================

/// Recognized S3 connection parameters.
///
/// # Invariants
/// - Variant declaration order matches the lexicographic order of
///   [`ParamKey::as_str`], so derived ordering is lexicographic by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParamKey {
    /// Access key identifier.
    #[serde(rename = "AWS_ACCESS_KEY_ID")]
    AccessKeyId,
    /// Custom endpoint URL.
    #[serde(rename = "AWS_ENDPOINT")]
    Endpoint,
    /// Signing region.
    #[serde(rename = "AWS_REGION")]
    Region,
    /// Secret access key.
    #[serde(rename = "AWS_SECRET_ACCESS_KEY")]
    SecretAccessKey,
    /// Temporary session token.
    #[serde(rename = "AWS_SESSION_TOKEN")]
    SessionToken,
    /// Disable request checksum calculation and response validation.
    #[serde(rename = "AWS_SKIP_CHECKSUM")]
    SkipChecksum,
    /// Disable TLS certificate verification.
    #[serde(rename = "AWS_SKIP_TLS_VERIFY")]
    SkipTlsVerify,
    /// Use path-style bucket addressing.
    #[serde(rename = "AWS_USE_PATH_STYLE")]
    UsePathStyle,
}

impl ParamKey {
    /// All recognized keys in lexicographic order.
    pub const ALL: [Self; 8] = [
        Self::AccessKeyId,
        Self::Endpoint,
        Self::Region,
        Self::SecretAccessKey,
        Self::SessionToken,
        Self::SkipChecksum,
        Self::SkipTlsVerify,
        Self::UsePathStyle,
    ];

    /// Returns the wire name used in URLs and environment variables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessKeyId => "AWS_ACCESS_KEY_ID",
            Self::Endpoint => "AWS_ENDPOINT",
            Self::Region => "AWS_REGION",
            Self::SecretAccessKey => "AWS_SECRET_ACCESS_KEY",
            Self::SessionToken => "AWS_SESSION_TOKEN",
            Self::SkipChecksum => "AWS_SKIP_CHECKSUM",
            Self::SkipTlsVerify => "AWS_SKIP_TLS_VERIFY",
            Self::UsePathStyle => "AWS_USE_PATH_STYLE",
        }
    }

    /// Returns true when the value must never be surfaced for display.
    #[must_use]
    pub const fn is_sensitive(self) -> bool {
        matches!(self, Self::SecretAccessKey | Self::SessionToken)
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamKey {
    type Err = ParamError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| ParamError::InvalidParameter(value.to_string()))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Parameter set errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// The key is not a recognized parameter.
    #[error("invalid param {0:?}")]
    InvalidParameter(String),
}

// ============================================================================
// SECTION: Parameter Set
// ============================================================================

/// Ordered mapping of recognized parameter keys to values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    /// Parameter values keyed by recognized name.
    entries: BTreeMap<ParamKey, String>,
}

impl ParameterSet {
    /// Creates an empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Sets a value for a recognized key, replacing any previous value.
    pub fn insert(&mut self, key: ParamKey, value: impl Into<String>) {
        self.entries.insert(key, value.into());
    }

    /// Sets a value by wire name.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::InvalidParameter`] when `key` is not recognized.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), ParamError> {
        let key = key.parse::<ParamKey>()?;
        self.insert(key, value);
        Ok(())
    }

    /// Returns the value for a key.
    #[must_use]
    pub fn get(&self, key: ParamKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    /// Returns true when the key holds the literal value `true`.
    #[must_use]
    pub fn is_enabled(&self, key: ParamKey) -> bool {
        self.get(key) == Some("true")
    }

    /// Returns true when a value is present for the key.
    #[must_use]
    pub fn contains(&self, key: ParamKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the set has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in lexicographic key order.
    pub fn iter(&self) -> impl Iterator<Item = (ParamKey, &str)> {
        self.entries.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Returns a copy with sensitive values replaced by [`OBFUSCATED`].
    #[must_use]
    pub fn obfuscated(&self) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(key, value)| {
                let shown = if key.is_sensitive() { OBFUSCATED.to_string() } else { value.clone() };
                (*key, shown)
            })
            .collect();
        Self {
            entries,
        }
    }

    /// Encodes all entries as a URL query string in lexicographic key order.
    #[must_use]
    pub fn escaped_query(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.entries {
            serializer.append_pair(key.as_str(), value);
        }
        serializer.finish()
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

impl FromIterator<(ParamKey, String)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (ParamKey, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
