// crates/blobcheck-core/src/core/identifiers.rs
// ============================================================================
// Module: SQL Identifiers
// Description: Validated identifiers for databases, schemas, tables, and connections.
// Purpose: Keep names interpolated into SQL statements free of quoting hazards.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Statements issued by the database layer embed object names directly, so
//! every name is an [`Ident`]: ASCII letters, digits, and underscores, not
//! starting with a digit. [`KvTable`] ties a database, schema, and table name
//! together and renders the fully qualified `db.schema.table` form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Identifier
// ============================================================================

/// Identifier validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentError {
    /// Identifier is empty or contains characters outside `[A-Za-z0-9_]`.
    #[error("invalid identifier {0:?}")]
    Invalid(String),
}

/// SQL identifier safe for direct interpolation.
///
/// # Invariants
/// - Non-empty, ASCII alphanumeric or `_`, first character not a digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ident(String);

impl Ident {
    /// Validates and wraps an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentError::Invalid`] when the name is not a plain identifier.
    pub fn new(name: impl Into<String>) -> Result<Self, IdentError> {
        let name = name.into();
        let mut chars = name.chars();
        let valid_head = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if valid_head && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Ok(Self(name))
        } else {
            Err(IdentError::Invalid(name))
        }
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ident {
    type Error = IdentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ident> for String {
    fn from(value: Ident) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Objects
// ============================================================================

/// A database in the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Database {
    /// Database name.
    pub name: Ident,
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

/// A schema inside a database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name.
    pub name: Ident,
}

impl Schema {
    /// Returns the default `public` schema.
    #[must_use]
    pub fn public() -> Self {
        Self {
            name: Ident(String::from("public")),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

/// A two-column `(k, v)` string table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KvTable {
    /// Owning database.
    pub database: Database,
    /// Owning schema.
    pub schema: Schema,
    /// Table name.
    pub name: Ident,
}

impl KvTable {
    /// Builds a table in the `public` schema of `database`.
    #[must_use]
    pub fn in_public(database: Database, name: Ident) -> Self {
        Self {
            database,
            schema: Schema::public(),
            name,
        }
    }

    /// Returns the `schema.table` form used by backup metadata.
    #[must_use]
    pub fn local_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

impl fmt::Display for KvTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::Ident;

    #[test]
    fn ident_accepts_plain_names() {
        assert!(Ident::new("_blobcheck").is_ok());
        assert!(Ident::new("mytable2").is_ok());
    }

    #[test]
    fn ident_rejects_quoting_hazards() {
        assert!(Ident::new("").is_err());
        assert!(Ident::new("1abc").is_err());
        assert!(Ident::new("a'b").is_err());
        assert!(Ident::new("a.b").is_err());
        assert!(Ident::new("a b").is_err());
    }
}
