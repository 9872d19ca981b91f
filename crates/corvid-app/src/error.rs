//! Error surface for bootstrap and runtime failures.

use corvid_config::ConfigError;
use corvid_moderation::ModerationError;
use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised while bootstrapping or running the worker.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing.
    #[error("missing required environment variable")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A configuration value from the environment is invalid.
    #[error("invalid configuration value")]
    InvalidConfig {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// Configuration service failure.
    #[error("configuration failure")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying configuration error.
        source: ConfigError,
    },
    /// Moderation subsystem failure.
    #[error("moderation failure")]
    Moderation {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying moderation error.
        source: ModerationError,
    },
    /// Telemetry initialisation failure.
    #[error("telemetry failure")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying error.
        source: anyhow::Error,
    },
    /// API server failure.
    #[error("api server failure")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying error.
        source: anyhow::Error,
    },
    /// Filesystem or network IO failure.
    #[error("io failure")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

impl AppError {
    /// Wrap a configuration error with its operation context.
    #[must_use]
    pub const fn config(operation: &'static str, source: ConfigError) -> Self {
        Self::Config { operation, source }
    }

    /// Wrap a moderation error with its operation context.
    #[must_use]
    pub const fn moderation(operation: &'static str, source: ModerationError) -> Self {
        Self::Moderation { operation, source }
    }

    /// Wrap a telemetry error with its operation context.
    #[must_use]
    pub fn telemetry(operation: &'static str, source: anyhow::Error) -> Self {
        Self::Telemetry { operation, source }
    }

    /// Wrap an API server error with its operation context.
    #[must_use]
    pub fn api_server(operation: &'static str, source: anyhow::Error) -> Self {
        Self::ApiServer { operation, source }
    }

    /// Wrap an IO error with its operation context.
    #[must_use]
    pub const fn io(operation: &'static str, source: std::io::Error) -> Self {
        Self::Io { operation, source }
    }
}
