#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Corvid public API.
//!
//! These types are the wire contract between the server and its clients:
//! packed entity representations, request/response bodies, and the
//! RFC9457-style problem payloads. The [`Id`] type lives here because every
//! request that names an entity is validated against the same identifier
//! format.

pub mod id;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use id::{Id, IdError};

/// Packed representation of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedUser {
    /// Object id of the account.
    pub id: Id,
    /// Unique handle.
    pub username: String,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
    /// Whether the account holds instance administrator rights.
    pub is_admin: bool,
    /// Whether the account is marked as a teacher.
    pub is_teacher: bool,
    /// Whether the account is exempt from billing.
    pub billing_exempt: bool,
}

/// Packed representation of a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedNote {
    /// Object id of the note.
    pub id: Id,
    /// Object id of the authoring user.
    pub user_id: Id,
    /// Note body, absent for renote-only entries.
    pub text: Option<String>,
    /// Visibility label (`public`, `home`, `followers`).
    pub visibility: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Campra association, when present.
    pub campra_for: Option<String>,
    /// Raw moderation scan verdict as returned by the scan API.
    pub iffy_scan_result: Option<serde_json::Value>,
    /// Link to the moderation scan record.
    pub iffy_scan_url: Option<String>,
}

/// Packed representation of a school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedSchool {
    /// Object id of the school.
    pub id: Id,
    /// Display name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Object id of the logo asset, when one is set.
    pub logo_id: Option<String>,
}

/// Request body for the emoji archive import endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmojiImportRequest {
    /// Identifier of the uploaded archive to import from.
    pub file_id: String,
}

/// Acknowledgement returned once an import job has been enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiImportResponse {
    /// Always `true`; the job itself runs asynchronously.
    pub success: bool,
}

/// Request body for creating a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    /// Object id of the authoring user.
    pub user_id: String,
    /// Note body.
    pub text: String,
    /// Visibility label; defaults to `public` when omitted.
    #[serde(default)]
    pub visibility: Option<String>,
    /// Optional campra association.
    #[serde(default)]
    pub campra_for: Option<String>,
}

/// RFC9457-style problem payload returned for API errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// Problem type identifier.
    #[serde(rename = "type")]
    pub kind: String,
    /// Short human-readable summary.
    pub title: String,
    /// HTTP status code mirrored into the body.
    pub status: u16,
    /// Optional human-readable detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Field-level validation failures, when applicable.
    #[serde(rename = "invalid-params", skip_serializing_if = "Option::is_none")]
    pub invalid_params: Option<Vec<ProblemInvalidParam>>,
}

/// Field-level validation failure entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemInvalidParam {
    /// JSON pointer to the offending field.
    pub pointer: String,
    /// Human-readable description of the failure.
    pub message: String,
}
