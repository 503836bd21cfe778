// crates/blobcheck-core/src/core/backup.rs
// ============================================================================
// Module: Backup Metadata
// Description: Backup entries, node transfer statistics, and server versions.
// Purpose: Typed views over rows returned by backup and connection checks.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! [`TableBackup`] is one row of backup metadata for the source table and
//! [`NodeStats`] is one node's answer to a connection check. Both mirror
//! what the database reports and carry no validation of their own.
//! [`ServerVersion`] is parsed from the `version()` banner and gates
//! whether connection checks are attempted at all.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::KvTable;

// ============================================================================
// SECTION: Backups
// ============================================================================

/// Backup flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupKind {
    /// Complete table state.
    Full,
    /// Changes since the previous backup in the same collection.
    Incremental,
}

impl BackupKind {
    /// Maps the `backup_type` column of backup metadata.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("full") { Self::Full } else { Self::Incremental }
    }
}

impl fmt::Display for BackupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("full"),
            Self::Incremental => f.write_str("incremental"),
        }
    }
}

/// One backup entry for a table inside a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBackup {
    /// Table covered by the entry.
    pub table: KvTable,
    /// Full or incremental.
    pub kind: BackupKind,
    /// Backup end time.
    pub end_time: OffsetDateTime,
}

// ============================================================================
// SECTION: Node Statistics
// ============================================================================

/// Per-node result of an external connection check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStats {
    /// Node identifier.
    pub node: i64,
    /// Node locality string.
    pub locality: String,
    /// Whether the node completed the check.
    pub success: bool,
    /// Error text reported by the node; empty on success.
    pub error: String,
    /// Bytes transferred, as reported.
    pub transferred: String,
    /// Read throughput, as reported.
    pub read_speed: String,
    /// Write throughput, as reported.
    pub write_speed: String,
    /// Whether the node could delete its check objects.
    pub can_delete: bool,
}

// ============================================================================
// SECTION: Server Version
// ============================================================================

/// Database server release version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    /// Major release (year).
    pub major: u32,
    /// Minor release.
    pub minor: u32,
    /// Patch release.
    pub patch: u32,
}

impl ServerVersion {
    /// Minimum version that supports connection throughput checks.
    pub const MIN_FOR_STATS: Self = Self::new(25, 1, 0);

    /// Creates a version triple.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extracts the first `vX.Y.Z` token from a server version banner.
    ///
    /// Pre-release suffixes (`v25.1.0-beta.2`) are ignored.
    #[must_use]
    pub fn parse_banner(banner: &str) -> Option<Self> {
        banner.split_whitespace().find_map(|token| {
            let numbers = token.strip_prefix('v')?;
            let core = numbers.split(['-', '+']).next()?;
            let mut parts = core.split('.').map(str::parse::<u32>);
            let major = parts.next()?.ok()?;
            let minor = parts.next()?.ok()?;
            let patch = parts.next()?.ok()?;
            Some(Self::new(major, minor, patch))
        })
    }

    /// Returns true when this version is at least `other`.
    #[must_use]
    pub fn at_least(self, other: Self) -> bool {
        self >= other
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}
