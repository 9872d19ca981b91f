//! Error types for the data access layer.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use corvid_api_models::IdError;

/// Result alias for data layer operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors raised by the data access layer.
#[derive(Debug)]
pub enum DataError {
    /// A schema migration failed to apply or revert.
    MigrationFailed {
        /// Name of the migration that failed.
        name: &'static str,
        /// Underlying SQL error.
        source: sqlx::Error,
    },
    /// A database operation failed.
    QueryFailed {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying SQL error.
        source: sqlx::Error,
    },
    /// A row referenced by id does not exist.
    NotFound {
        /// Entity kind that was looked up.
        entity: &'static str,
        /// Identifier that was not found.
        id: String,
    },
    /// A persisted row held an identifier outside the platform id format.
    InvalidRow {
        /// Entity kind whose row was invalid.
        entity: &'static str,
        /// Underlying identifier validation error.
        source: IdError,
    },
}

impl Display for DataError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MigrationFailed { .. } => formatter.write_str("migration failed"),
            Self::QueryFailed { .. } => formatter.write_str("database operation failed"),
            Self::NotFound { .. } => formatter.write_str("row not found"),
            Self::InvalidRow { .. } => formatter.write_str("row held an invalid identifier"),
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MigrationFailed { source, .. } | Self::QueryFailed { source, .. } => Some(source),
            Self::InvalidRow { source, .. } => Some(source),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<sqlx::Error> for DataError {
    fn from(source: sqlx::Error) -> Self {
        Self::QueryFailed {
            operation: "sqlx operation",
            source,
        }
    }
}
