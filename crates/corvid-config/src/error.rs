//! Error types for configuration operations.

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The stored confidence threshold label was not recognised.
    #[error("invalid confidence threshold")]
    InvalidThreshold {
        /// Offending label.
        value: String,
    },
    /// The stored automod account id was outside the platform id format.
    #[error("invalid automod account id")]
    InvalidAutomodAccount {
        /// Offending value.
        value: String,
    },
    /// Underlying database operation failed.
    #[error("database operation failed")]
    Database {
        /// Operation identifier.
        operation: &'static str,
        /// Source database error.
        source: sqlx::Error,
    },
    /// Data layer operation failed.
    #[error("data access failed")]
    DataAccess {
        /// Operation identifier.
        operation: &'static str,
        /// Source data-layer error.
        source: corvid_data::DataError,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
