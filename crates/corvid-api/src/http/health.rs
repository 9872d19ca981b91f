//! Health and diagnostics endpoints.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::http::errors::ApiError;
use crate::state::ApiState;

#[derive(Serialize, Debug)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) database: &'static str,
    pub(crate) queue_depth: i64,
}

pub(crate) async fn health(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    match state.config.settings().await {
        Ok(_) => Ok(Json(HealthResponse {
            status: "ok",
            database: "ok",
            queue_depth: state.telemetry.snapshot().queue_depth,
        })),
        Err(err) => {
            warn!(error = %err, "health check failed to reach database");
            Err(ApiError::service_unavailable(
                "database is currently unavailable",
            ))
        }
    }
}

pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    match state.telemetry.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )
            .body(Body::from(body))
            .map_err(|err| {
                error!(error = %err, "failed to build metrics response");
                ApiError::internal("failed to build metrics response")
            }),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            Err(ApiError::internal("failed to render metrics"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::{RecordingExecutor, stub_state, stub_state_unreachable};

    #[tokio::test]
    async fn health_reports_ok_when_settings_load() {
        let executor = RecordingExecutor::new(false);
        let (state, _worker) = stub_state(executor);

        let Json(body) = health(State(state)).await.expect("healthy");
        assert_eq!(body.status, "ok");
        assert_eq!(body.database, "ok");
        assert_eq!(body.queue_depth, 0);
    }

    #[tokio::test]
    async fn health_degrades_when_settings_fail() {
        let executor = RecordingExecutor::new(false);
        let (state, _worker) = stub_state_unreachable(executor);

        let error = health(State(state)).await.expect_err("unhealthy");
        assert_eq!(error.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn metrics_render_in_text_exposition_format() {
        let executor = RecordingExecutor::new(false);
        let (state, _worker) = stub_state(executor);
        state.telemetry.inc_http_request("/health", 200);

        let response = metrics(State(state)).await.expect("render");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
