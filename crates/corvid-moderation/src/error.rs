//! Error types for the moderation subsystem.

use thiserror::Error;

/// Errors raised by the auto-moderator and its scan client.
#[derive(Debug, Error)]
pub enum ModerationError {
    /// The configured automod account does not exist.
    #[error("automod account missing")]
    AccountMissing {
        /// Account id that failed to resolve.
        id: String,
    },
    /// The note to scan does not exist.
    #[error("note missing")]
    NoteMissing {
        /// Note id that failed to resolve.
        id: String,
    },
    /// The outbound scan request failed to complete.
    #[error("scan request failed")]
    ScanRequest {
        /// Underlying HTTP error.
        source: reqwest::Error,
    },
    /// The scan API answered with a non-success status.
    #[error("scan api returned an error status")]
    ScanStatus {
        /// HTTP status code returned by the scan API.
        status: u16,
    },
    /// The scan API response body could not be decoded.
    #[error("scan response could not be decoded")]
    ScanDecode {
        /// Underlying decode error.
        source: reqwest::Error,
    },
    /// The scan verdict could not be re-encoded for persistence.
    #[error("scan verdict could not be encoded")]
    VerdictEncode {
        /// Underlying encode error.
        source: serde_json::Error,
    },
    /// Data layer operation failed.
    #[error("data access failed")]
    Data {
        /// Operation identifier.
        operation: &'static str,
        /// Source data-layer error.
        source: corvid_data::DataError,
    },
}
