//! User and school lookup endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use corvid_api_models::{Id, PackedSchool, PackedUser, ProblemInvalidParam};
use corvid_data::PackSource;

use crate::http::errors::{ApiError, map_data_error};
use crate::state::ApiState;

fn malformed_id() -> ApiError {
    ApiError::bad_request("identifier is not a valid object id").with_invalid_params(vec![
        ProblemInvalidParam {
            pointer: "/id".into(),
            message: "must match the platform object id format".into(),
        },
    ])
}

pub(crate) async fn show_user(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<PackedUser>, ApiError> {
    let id = Id::new(id).map_err(|_| malformed_id())?;
    state
        .users
        .pack(PackSource::Id(&id))
        .await
        .map(Json)
        .map_err(|err| map_data_error(err, "users.pack"))
}

pub(crate) async fn show_school(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<PackedSchool>, ApiError> {
    let id = Id::new(id).map_err(|_| malformed_id())?;
    state
        .schools
        .pack(PackSource::Id(&id))
        .await
        .map(Json)
        .map_err(|err| map_data_error(err, "schools.pack"))
}
