//! Release metadata passthrough endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::error;

use crate::http::errors::ApiError;
use crate::state::ApiState;

pub(crate) async fn release_notes(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.release.fetch().await.map(Json).map_err(|err| {
        error!(error = %err, "release feed fetch failed");
        ApiError::bad_gateway("failed to fetch release metadata")
    })
}
