//! Outbound client for the content scan API.

use corvid_config::ConfidenceThreshold;
use serde::{Deserialize, Serialize};

use crate::error::ModerationError;

#[derive(Serialize)]
struct ScanRequestBody<'a> {
    content: &'a str,
}

/// Verdict returned by the scan API for a piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanVerdict {
    /// Whether the scanner flagged the content.
    pub flagged: bool,
    /// Confidence label reported alongside the flag.
    pub confidence: ConfidenceThreshold,
    /// Link to the scan record, when the API exposes one.
    #[serde(default)]
    pub record_url: Option<String>,
}

/// Thin HTTP wrapper around the scan API endpoint.
#[derive(Debug, Clone)]
pub struct IffyClient {
    http: reqwest::Client,
    api_url: String,
}

impl IffyClient {
    /// Build a client posting to the given scan endpoint.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    /// Submit content for scanning and return the verdict.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails, the API answers with a
    /// non-success status, or the body cannot be decoded.
    pub async fn scan(&self, content: &str) -> Result<ScanVerdict, ModerationError> {
        let response = self
            .http
            .post(&self.api_url)
            .json(&ScanRequestBody { content })
            .send()
            .await
            .map_err(|source| ModerationError::ScanRequest { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModerationError::ScanStatus {
                status: status.as_u16(),
            });
        }

        response
            .json::<ScanVerdict>()
            .await
            .map_err(|source| ModerationError::ScanDecode { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verdict_decodes_with_and_without_record_url() {
        let full: ScanVerdict = serde_json::from_value(json!({
            "flagged": true,
            "confidence": "high",
            "record_url": "https://iffy.example/records/7"
        }))
        .expect("decode");
        assert!(full.flagged);
        assert_eq!(full.confidence, ConfidenceThreshold::High);
        assert_eq!(
            full.record_url.as_deref(),
            Some("https://iffy.example/records/7")
        );

        let bare: ScanVerdict =
            serde_json::from_value(json!({"flagged": false, "confidence": "low"}))
                .expect("decode");
        assert!(!bare.flagged);
        assert!(bare.record_url.is_none());
    }
}
