//! Repository and pack serializer for notes.

use corvid_api_models::{Id, PackedNote};
use sqlx::PgPool;
use sqlx::types::Json;

use crate::error::{DataError, Result};
use crate::pack::PackSource;
use crate::rows::NoteRow;

const NOTE_COLUMNS: &str = r"
    id, user_id, text, visibility, created_at,
    campra_for, iffy_scan_result, iffy_scan_url
";

const SELECT_NOTE: &str = r"
    SELECT id, user_id, text, visibility, created_at,
           campra_for, iffy_scan_result, iffy_scan_url
    FROM notes
    WHERE id = $1
";

const UPDATE_SCAN: &str = r"
    UPDATE notes
    SET iffy_scan_result = $2,
        iffy_scan_url = $3
    WHERE id = $1
";

/// Fields accepted when creating a note.
#[derive(Debug, Clone)]
pub struct NewNote {
    /// Object id for the new note.
    pub id: Id,
    /// Authoring user id.
    pub user_id: Id,
    /// Note body.
    pub text: String,
    /// Visibility label.
    pub visibility: String,
    /// Optional campra association.
    pub campra_for: Option<String>,
}

/// Database-backed repository for notes.
#[derive(Clone)]
pub struct NoteStore {
    pool: PgPool,
}

impl NoteStore {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a note row by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn fetch(&self, id: &Id) -> Result<Option<NoteRow>> {
        sqlx::query_as::<_, NoteRow>(SELECT_NOTE)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "notes.fetch",
                source,
            })
    }

    /// Insert a new note and return the persisted row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (for example, on a missing
    /// author).
    pub async fn insert(&self, note: &NewNote) -> Result<NoteRow> {
        let sql = format!(
            "INSERT INTO notes (id, user_id, text, visibility, campra_for) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {NOTE_COLUMNS}"
        );
        sqlx::query_as::<_, NoteRow>(&sql)
            .bind(note.id.as_str())
            .bind(note.user_id.as_str())
            .bind(&note.text)
            .bind(&note.visibility)
            .bind(note.campra_for.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "notes.insert",
                source,
            })
    }

    /// Persist a moderation scan verdict onto a note.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotFound`] when the note does not exist, or an
    /// error if the update fails.
    pub async fn record_scan(
        &self,
        id: &Id,
        verdict: &serde_json::Value,
        record_url: Option<&str>,
    ) -> Result<()> {
        let result = sqlx::query(UPDATE_SCAN)
            .bind(id.as_str())
            .bind(Json(verdict))
            .bind(record_url)
            .execute(&self.pool)
            .await
            .map_err(|source| DataError::QueryFailed {
                operation: "notes.record_scan",
                source,
            })?;
        if result.rows_affected() == 0 {
            return Err(DataError::NotFound {
                entity: "note",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Serialize a note to its API representation.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotFound`] when packing by id and no row exists,
    /// or an error if the lookup fails.
    pub async fn pack(&self, source: PackSource<'_, NoteRow>) -> Result<PackedNote> {
        match source {
            PackSource::Loaded(row) => pack_note_row(row),
            PackSource::Id(id) => {
                let row = self.fetch(id).await?.ok_or_else(|| DataError::NotFound {
                    entity: "note",
                    id: id.to_string(),
                })?;
                pack_note_row(&row)
            }
        }
    }
}

fn pack_note_row(row: &NoteRow) -> Result<PackedNote> {
    let id = Id::new(row.id.clone()).map_err(|source| DataError::InvalidRow {
        entity: "note",
        source,
    })?;
    let user_id = Id::new(row.user_id.clone()).map_err(|source| DataError::InvalidRow {
        entity: "note",
        source,
    })?;
    Ok(PackedNote {
        id,
        user_id,
        text: row.text.clone(),
        visibility: row.visibility.clone(),
        created_at: row.created_at,
        campra_for: row.campra_for.clone(),
        iffy_scan_result: row.iffy_scan_result.as_ref().map(|json| json.0.clone()),
        iffy_scan_url: row.iffy_scan_url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn sample_row() -> NoteRow {
        NoteRow {
            id: "f6e5d4c3b2".into(),
            user_id: "a1b2c3d4e5".into(),
            text: Some("hello".into()),
            visibility: "public".into(),
            created_at: Utc::now(),
            campra_for: Some("spring2026".into()),
            iffy_scan_result: Some(Json(json!({"flagged": false, "confidence": "low"}))),
            iffy_scan_url: Some("https://iffy.example/records/1".into()),
        }
    }

    #[test]
    fn pack_maps_every_field() {
        let row = sample_row();
        let packed = pack_note_row(&row).expect("pack");
        assert_eq!(packed.id.as_str(), row.id);
        assert_eq!(packed.user_id.as_str(), row.user_id);
        assert_eq!(packed.text, row.text);
        assert_eq!(packed.visibility, row.visibility);
        assert_eq!(packed.campra_for, row.campra_for);
        assert_eq!(
            packed.iffy_scan_result,
            Some(json!({"flagged": false, "confidence": "low"}))
        );
        assert_eq!(packed.iffy_scan_url, row.iffy_scan_url);
    }

    #[test]
    fn pack_keeps_unscanned_notes_bare() {
        let mut row = sample_row();
        row.iffy_scan_result = None;
        row.iffy_scan_url = None;
        let packed = pack_note_row(&row).expect("pack");
        assert!(packed.iffy_scan_result.is_none());
        assert!(packed.iffy_scan_url.is_none());
    }
}
