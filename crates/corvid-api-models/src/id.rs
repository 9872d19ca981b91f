//! Platform object identifiers.
//!
//! Every persisted entity is keyed by a short lowercase alphanumeric id
//! generated by the platform. Inbound identifiers are validated against the
//! same format before they reach the data layer.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Pattern every platform object id must match.
const ID_PATTERN: &str = "^[0-9a-z]{10,32}$";

static ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(ID_PATTERN).expect("object id pattern is a valid regex"));

/// Validated platform object identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Id(String);

impl Id {
    /// Validate a raw identifier against the platform id format.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidFormat`] when the input does not match
    /// `^[0-9a-z]{10,32}$`.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdError> {
        let raw = raw.into();
        if ID_REGEX.is_match(&raw) {
            Ok(Self(raw))
        } else {
            Err(IdError::InvalidFormat { value: raw })
        }
    }

    /// Generate a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl TryFrom<String> for Id {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.0
    }
}

/// Errors raised while validating object identifiers.
#[derive(Debug, Error)]
pub enum IdError {
    /// Input did not match the platform id format.
    #[error("invalid object id")]
    InvalidFormat {
        /// Offending input.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_lowercase_alphanumeric_ids() {
        for raw in ["a1b2c3d4e5", "0123456789abcdef", "z".repeat(32).as_str()] {
            assert!(Id::new(raw).is_ok(), "expected '{raw}' to validate");
        }
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in ["", "short", "UPPERCASE99", "has-dashes-in", "x".repeat(33).as_str()] {
            assert!(Id::new(raw).is_err(), "expected '{raw}' to be rejected");
        }
    }

    #[test]
    fn generated_ids_match_the_format() {
        for _ in 0..16 {
            let id = Id::generate();
            assert!(Id::new(id.as_str()).is_ok(), "generated id '{id}' invalid");
        }
    }

    #[test]
    fn round_trips_through_serde() {
        let id = Id::new("a1b2c3d4e5").expect("id");
        let encoded = serde_json::to_string(&id).expect("encode");
        assert_eq!(encoded, "\"a1b2c3d4e5\"");
        let decoded: Id = serde_json::from_str(&encoded).expect("decode");
        assert_eq!(decoded, id);
    }

    #[test]
    fn deserialization_rejects_invalid_input() {
        let result: Result<Id, _> = serde_json::from_str("\"NOT VALID\"");
        assert!(result.is_err());
    }
}
