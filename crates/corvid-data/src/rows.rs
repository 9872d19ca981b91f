//! Raw row projections of the persisted tables.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;

/// Raw projection of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    /// Primary key.
    pub id: String,
    /// Unique handle.
    pub username: String,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Instance administrator flag.
    pub is_admin: bool,
    /// Suspension flag.
    pub is_suspended: bool,
    /// Billing exemption flag.
    pub billing_exempt: bool,
    /// Teacher role flag.
    pub is_teacher: bool,
}

/// Raw projection of the `notes` table.
#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    /// Primary key.
    pub id: String,
    /// Authoring user id.
    pub user_id: String,
    /// Note body.
    pub text: Option<String>,
    /// Visibility label.
    pub visibility: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Campra association, when present.
    pub campra_for: Option<String>,
    /// Raw moderation scan verdict.
    pub iffy_scan_result: Option<Json<serde_json::Value>>,
    /// Link to the moderation scan record.
    pub iffy_scan_url: Option<String>,
}

/// Raw projection of the `meta` singleton configuration row.
#[derive(Debug, Clone, FromRow)]
pub struct MetaRow {
    /// Fixed singleton id.
    pub id: String,
    /// Instance name.
    pub name: Option<String>,
    /// Instance description.
    pub description: Option<String>,
    /// Maintainer contact address.
    pub maintainer_email: Option<String>,
    /// Moderation scan API endpoint.
    pub iffy_api_url: Option<String>,
    /// Moderation confidence threshold label.
    pub iffy_confidence_threshold: String,
    /// Acting account for automated moderation.
    pub automod_account_id: Option<String>,
}

/// Raw projection of the `schools` table.
#[derive(Debug, Clone, FromRow)]
pub struct SchoolRow {
    /// Primary key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Logo asset id, when set.
    pub logo_id: Option<String>,
}
