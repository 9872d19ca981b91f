//! The auto-moderator service.

use corvid_api_models::Id;
use corvid_config::{ConfidenceThreshold, InstanceSettings};
use corvid_data::{NoteStore, UserStore};
use corvid_telemetry::Metrics;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::client::IffyClient;
use crate::error::ModerationError;

/// Result of scanning a single note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Scanning is disabled or the note carries no scannable text.
    Skipped,
    /// The verdict did not meet the configured confidence threshold.
    Clean,
    /// The verdict flagged the note at or above the threshold.
    Flagged,
}

impl ScanOutcome {
    /// Stable label used for logging and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Clean => "clean",
            Self::Flagged => "flagged",
        }
    }
}

struct EngineState {
    client: IffyClient,
    threshold: ConfidenceThreshold,
    automod_account_id: Option<Id>,
}

/// Content auto-moderation service.
///
/// Constructed once at process start; [`AutoModerator::initialize`] must
/// complete before scans are dispatched.
pub struct AutoModerator {
    users: UserStore,
    notes: NoteStore,
    metrics: Metrics,
    state: RwLock<Option<EngineState>>,
}

impl AutoModerator {
    /// Build the service over a connection pool.
    #[must_use]
    pub fn new(pool: PgPool, metrics: Metrics) -> Self {
        Self {
            users: UserStore::new(pool.clone()),
            notes: NoteStore::new(pool),
            metrics,
            state: RwLock::new(None),
        }
    }

    /// Load moderation settings and prepare the scan client.
    ///
    /// Verifies that the configured automod account exists before accepting
    /// the configuration. When no scan API URL is configured the service
    /// stays disabled and later scans are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error when the automod account cannot be resolved or the
    /// lookup fails.
    #[instrument(name = "auto_moderator.initialize", skip_all)]
    pub async fn initialize(&self, settings: &InstanceSettings) -> Result<(), ModerationError> {
        let moderation = &settings.moderation;

        if let Some(account_id) = &moderation.automod_account_id {
            let account = self.users.fetch(account_id).await.map_err(|source| {
                ModerationError::Data {
                    operation: "moderation.verify_account",
                    source,
                }
            })?;
            if account.is_none() {
                return Err(ModerationError::AccountMissing {
                    id: account_id.to_string(),
                });
            }
        }

        let engine = moderation.api_url.as_ref().map(|api_url| EngineState {
            client: IffyClient::new(api_url.clone()),
            threshold: moderation.confidence_threshold,
            automod_account_id: moderation.automod_account_id.clone(),
        });

        if let Some(engine) = &engine {
            info!(threshold = %engine.threshold, "auto-moderator initialised");
        } else {
            info!("scan api not configured; auto-moderation disabled");
        }

        *self.state.write().await = engine;
        Ok(())
    }

    /// Scan a note's text and persist the verdict onto the note.
    ///
    /// # Errors
    ///
    /// Returns an error when the note cannot be resolved, the scan request
    /// fails, or persisting the verdict fails.
    #[instrument(name = "auto_moderator.scan_note", skip(self), fields(note_id = %note_id))]
    pub async fn scan_note(&self, note_id: &Id) -> Result<ScanOutcome, ModerationError> {
        let guard = self.state.read().await;
        let Some(engine) = guard.as_ref() else {
            self.metrics.inc_note_scanned(ScanOutcome::Skipped.as_str());
            return Ok(ScanOutcome::Skipped);
        };

        let note = self
            .notes
            .fetch(note_id)
            .await
            .map_err(|source| ModerationError::Data {
                operation: "moderation.fetch_note",
                source,
            })?
            .ok_or_else(|| ModerationError::NoteMissing {
                id: note_id.to_string(),
            })?;

        let Some(text) = note.text.as_deref() else {
            self.metrics.inc_note_scanned(ScanOutcome::Skipped.as_str());
            return Ok(ScanOutcome::Skipped);
        };

        let verdict = match engine.client.scan(text).await {
            Ok(verdict) => verdict,
            Err(error) => {
                self.metrics.inc_scan_failure();
                return Err(error);
            }
        };

        let raw = serde_json::to_value(&verdict)
            .map_err(|source| ModerationError::VerdictEncode { source })?;
        self.notes
            .record_scan(note_id, &raw, verdict.record_url.as_deref())
            .await
            .map_err(|source| ModerationError::Data {
                operation: "moderation.record_scan",
                source,
            })?;

        let outcome = if verdict.flagged && verdict.confidence >= engine.threshold {
            ScanOutcome::Flagged
        } else {
            ScanOutcome::Clean
        };
        self.metrics.inc_note_scanned(outcome.as_str());

        if outcome == ScanOutcome::Flagged {
            let actor = engine
                .automod_account_id
                .as_ref()
                .map_or("unset", Id::as_str);
            info!(automod_account = actor, "note flagged by content scan");
        }
        Ok(outcome)
    }
}
