//! Note creation and lookup endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use corvid_api_models::{CreateNoteRequest, Id, PackedNote, ProblemInvalidParam};
use corvid_data::{DataError, NewNote, PackSource};
use corvid_queue::Job;
use tracing::warn;

use crate::http::errors::{ApiError, map_data_error};
use crate::state::ApiState;

const VISIBILITIES: [&str; 3] = ["public", "home", "followers"];
const MAX_CAMPRA_LEN: usize = 128;

fn invalid_param(pointer: &str, message: &str) -> ApiError {
    ApiError::bad_request("request body failed validation").with_invalid_params(vec![
        ProblemInvalidParam {
            pointer: pointer.into(),
            message: message.into(),
        },
    ])
}

pub(crate) async fn create_note(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<CreateNoteRequest>,
) -> Result<Json<PackedNote>, ApiError> {
    let user_id = Id::new(request.user_id)
        .map_err(|_| invalid_param("/userId", "must match the platform object id format"))?;
    if request.text.trim().is_empty() {
        return Err(invalid_param("/text", "must not be empty"));
    }
    let visibility = request
        .visibility
        .unwrap_or_else(|| VISIBILITIES[0].to_string());
    if !VISIBILITIES.contains(&visibility.as_str()) {
        return Err(invalid_param(
            "/visibility",
            "must be one of public, home, followers",
        ));
    }
    if let Some(campra) = &request.campra_for {
        if campra.len() > MAX_CAMPRA_LEN {
            return Err(invalid_param("/campraFor", "must be at most 128 characters"));
        }
    }

    let new_note = NewNote {
        id: Id::generate(),
        user_id,
        text: request.text,
        visibility,
        campra_for: request.campra_for,
    };
    let row = state
        .notes
        .insert(&new_note)
        .await
        .map_err(map_insert_error)?;

    // Scanning is best-effort; a stopped queue must not block authoring.
    if let Err(err) = state.queue.enqueue(Job::ScanNote {
        note_id: new_note.id.clone(),
    }) {
        warn!(error = %err, note_id = %new_note.id, "failed to enqueue moderation scan");
    }

    state
        .notes
        .pack(PackSource::Loaded(&row))
        .await
        .map(Json)
        .map_err(|err| map_data_error(err, "notes.pack"))
}

pub(crate) async fn show_note(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<PackedNote>, ApiError> {
    let id = Id::new(id)
        .map_err(|_| invalid_param("/id", "must match the platform object id format"))?;
    state
        .notes
        .pack(PackSource::Id(&id))
        .await
        .map(Json)
        .map_err(|err| map_data_error(err, "notes.pack"))
}

fn map_insert_error(error: DataError) -> ApiError {
    if let DataError::QueryFailed {
        source: sqlx::Error::Database(db),
        ..
    } = &error
    {
        // 23503: foreign key violation, i.e. the author does not exist.
        if db.code().as_deref() == Some("23503") {
            return ApiError::not_found("authoring user does not exist");
        }
    }
    map_data_error(error, "notes.insert")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn visibility_catalogue_defaults_to_public() {
        assert_eq!(VISIBILITIES[0], "public");
    }

    #[test]
    fn invalid_param_carries_the_pointer() {
        let error = invalid_param("/campraFor", "too long");
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        let params = error.invalid_params.expect("params");
        assert_eq!(params[0].pointer, "/campraFor");
    }
}
