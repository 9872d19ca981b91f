//! RFC9457-style API error wrapper.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use corvid_api_models::{ProblemDetails, ProblemInvalidParam};
use corvid_data::DataError;
use tracing::error;

const PROBLEM_BAD_REQUEST: &str = "bad_request";
const PROBLEM_NOT_FOUND: &str = "not_found";
const PROBLEM_INTERNAL: &str = "internal_error";
const PROBLEM_SERVICE_UNAVAILABLE: &str = "service_unavailable";
const PROBLEM_BAD_GATEWAY: &str = "bad_gateway";

/// Structured API error with optional RFC9457 fields.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) kind: &'static str,
    title: &'static str,
    detail: Option<String>,
    pub(crate) invalid_params: Option<Vec<ProblemInvalidParam>>,
}

impl ApiError {
    const fn new(status: StatusCode, kind: &'static str, title: &'static str) -> Self {
        Self {
            status,
            kind,
            title,
            detail: None,
            invalid_params: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub(crate) fn with_invalid_params(mut self, params: Vec<ProblemInvalidParam>) -> Self {
        self.invalid_params = Some(params);
        self
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            PROBLEM_INTERNAL,
            "internal server error",
        )
        .with_detail(message)
    }

    pub(crate) fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, PROBLEM_BAD_REQUEST, "bad request").with_detail(detail)
    }

    pub(crate) fn not_found(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            PROBLEM_NOT_FOUND,
            "resource not found",
        )
        .with_detail(detail)
    }

    pub(crate) fn service_unavailable(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            PROBLEM_SERVICE_UNAVAILABLE,
            "service unavailable",
        )
        .with_detail(detail)
    }

    pub(crate) fn bad_gateway(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, PROBLEM_BAD_GATEWAY, "bad gateway").with_detail(detail)
    }
}

/// Map a data-layer failure onto the API error surface.
pub(crate) fn map_data_error(error: DataError, operation: &'static str) -> ApiError {
    match error {
        DataError::NotFound { entity, id } => {
            ApiError::not_found(format!("{entity} '{id}' does not exist"))
        }
        other => {
            error!(error = %other, operation, "data access failed");
            ApiError::internal("data access failed")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ProblemDetails {
            kind: self.kind.to_string(),
            title: self.title.to_string(),
            status: self.status.as_u16(),
            detail: self.detail,
            invalid_params: self.invalid_params,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_from_data_error() {
        let mapped = map_data_error(
            DataError::NotFound {
                entity: "note",
                id: "a1b2c3d4e5".into(),
            },
            "notes.pack",
        );
        assert_eq!(mapped.status, StatusCode::NOT_FOUND);
        assert_eq!(mapped.kind, "not_found");
    }

    #[test]
    fn query_failures_map_to_internal() {
        let mapped = map_data_error(
            DataError::QueryFailed {
                operation: "notes.fetch",
                source: sqlx::Error::PoolClosed,
            },
            "notes.pack",
        );
        assert_eq!(mapped.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
