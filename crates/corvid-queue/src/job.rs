//! Background job kinds and their queue envelope.

use chrono::{DateTime, Utc};
use corvid_api_models::Id;
use uuid::Uuid;

/// Work items the platform defers to the background queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Import custom emojis from an uploaded archive.
    ImportEmojis {
        /// Identifier of the uploaded archive.
        file_id: Id,
    },
    /// Run a content moderation scan over a note.
    ScanNote {
        /// Identifier of the note to scan.
        note_id: Id,
    },
}

impl Job {
    /// Stable label used for logging and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ImportEmojis { .. } => "import_emojis",
            Self::ScanNote { .. } => "scan_note",
        }
    }
}

/// A job together with its queue bookkeeping.
#[derive(Debug, Clone)]
pub struct JobEnvelope {
    /// Queue-assigned identifier for correlation in logs.
    pub id: Uuid,
    /// Time the job was accepted.
    pub enqueued_at: DateTime<Utc>,
    /// The work item itself.
    pub job: Job,
}
