//! Outbound client for the release metadata feed.

use anyhow::{Context, Result};

/// Upstream feed queried by the release-notes endpoint.
pub const DEFAULT_RELEASE_URL: &str =
    "https://api.github.com/repos/corvid-platform/corvid/releases/latest";

/// HTTP client that fetches release metadata and hands the JSON body through
/// unmodified.
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    http: reqwest::Client,
    url: String,
}

impl Default for ReleaseClient {
    fn default() -> Self {
        Self::with_url(DEFAULT_RELEASE_URL)
    }
}

impl ReleaseClient {
    /// Build a client against an explicit upstream URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("corvid")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            url: url.into(),
        }
    }

    /// Fetch the upstream feed and return its JSON body as-is.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails, the upstream answers with a
    /// non-success status, or the body is not JSON.
    pub async fn fetch(&self) -> Result<serde_json::Value> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("release feed request failed")?
            .error_for_status()
            .context("release feed returned an error status")?;
        response
            .json::<serde_json::Value>()
            .await
            .context("release feed body was not valid json")
    }
}
