//! Emoji archive import endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use corvid_api_models::{EmojiImportRequest, EmojiImportResponse, Id, ProblemInvalidParam};
use corvid_queue::Job;
use tracing::{error, info};

use crate::http::errors::ApiError;
use crate::state::ApiState;

pub(crate) async fn import_emoji(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<EmojiImportRequest>,
) -> Result<Json<EmojiImportResponse>, ApiError> {
    let file_id = Id::new(request.file_id).map_err(|_| {
        ApiError::bad_request("file identifier is not a valid object id").with_invalid_params(
            vec![ProblemInvalidParam {
                pointer: "/fileId".into(),
                message: "must match the platform object id format".into(),
            }],
        )
    })?;

    let job_id = state
        .queue
        .enqueue(Job::ImportEmojis { file_id })
        .map_err(|err| {
            error!(error = %err, "failed to enqueue emoji import");
            ApiError::service_unavailable("job queue is not accepting work")
        })?;
    info!(%job_id, "emoji import enqueued");

    Ok(Json(EmojiImportResponse { success: true }))
}
