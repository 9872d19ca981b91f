//! Typed instance settings models.

use std::fmt;
use std::str::FromStr;

use corvid_api_models::Id;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Minimum confidence a moderation verdict must report before the platform
/// treats it as actionable. Labels order `low < medium < high`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceThreshold {
    /// Act on any reported confidence.
    Low,
    /// Act on medium or high confidence.
    #[default]
    Medium,
    /// Act only on high confidence.
    High,
}

impl ConfidenceThreshold {
    /// Stable label persisted in the `meta` table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceThreshold {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceThreshold {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ConfigError::InvalidThreshold {
                value: other.to_string(),
            }),
        }
    }
}

/// Moderation subsystem settings drawn from the `meta` singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationSettings {
    /// Scan API endpoint; scanning is disabled when absent.
    pub api_url: Option<String>,
    /// Minimum actionable confidence.
    pub confidence_threshold: ConfidenceThreshold,
    /// Acting account for automated moderation actions.
    pub automod_account_id: Option<Id>,
}

/// Typed snapshot of the instance-wide settings row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSettings {
    /// Instance name.
    pub name: Option<String>,
    /// Instance description.
    pub description: Option<String>,
    /// Maintainer contact address.
    pub maintainer_email: Option<String>,
    /// Moderation subsystem settings.
    pub moderation: ModerationSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_order_low_medium_high() {
        assert!(ConfidenceThreshold::Low < ConfidenceThreshold::Medium);
        assert!(ConfidenceThreshold::Medium < ConfidenceThreshold::High);
    }

    #[test]
    fn threshold_labels_round_trip() {
        for threshold in [
            ConfidenceThreshold::Low,
            ConfidenceThreshold::Medium,
            ConfidenceThreshold::High,
        ] {
            let parsed: ConfidenceThreshold =
                threshold.as_str().parse().expect("label parses back");
            assert_eq!(parsed, threshold);
        }
    }

    #[test]
    fn unknown_threshold_label_is_a_typed_error() {
        let error = "severe".parse::<ConfidenceThreshold>().expect_err("invalid");
        assert!(matches!(error, ConfigError::InvalidThreshold { value } if value == "severe"));
    }

    #[test]
    fn default_threshold_is_medium() {
        assert_eq!(ConfidenceThreshold::default(), ConfidenceThreshold::Medium);
    }
}
