//! Router construction and server host for the API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Router,
    extract::{MatchedPath, Request, State},
    http::{Method, header::CONTENT_TYPE},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use corvid_telemetry::REQUEST_ID_HEADER;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::http::{emoji, entities, health, notes, releases};
use crate::state::ApiState;

/// Axum router wrapper that hosts the Corvid API services.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct the server with shared dependencies wired through
    /// application state.
    #[must_use]
    pub fn new(state: Arc<ApiState>) -> Self {
        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]);

        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::http::Request<_>| {
                let method = request.method().clone();
                let uri_path = request.uri().path();
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %method,
                    route = %uri_path,
                    request_id = %request_id,
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    span.record("status_code", response.status().as_u16());
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );

        let layered = ServiceBuilder::new()
            .layer(corvid_telemetry::propagate_request_id_layer())
            .layer(corvid_telemetry::set_request_id_layer())
            .layer(trace_layer);

        let router = Router::new()
            .route("/health", get(health::health))
            .route("/metrics", get(health::metrics))
            .route("/v1/release-notes", get(releases::release_notes))
            .route("/v1/admin/emoji/import", post(emoji::import_emoji))
            .route("/v1/notes", post(notes::create_note))
            .route("/v1/notes/{id}", get(notes::show_note))
            .route("/v1/users/{id}", get(entities::show_user))
            .route("/v1/schools/{id}", get(entities::show_school))
            .layer(cors_layer)
            .route_layer(layered)
            .layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                track_request,
            ))
            .with_state(state);

        Self { router }
    }

    /// Serve the API on the supplied address.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server
    /// terminates unexpectedly.
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_on(listener).await
    }

    /// Serve the API on an already-bound listener.
    ///
    /// Binding first lets the caller confirm the listener is live before the
    /// serve task is spawned.
    ///
    /// # Errors
    ///
    /// Returns an error if the server terminates unexpectedly.
    pub async fn serve_on(self, listener: TcpListener) -> Result<()> {
        tracing::info!(addr = %listener.local_addr()?, "starting api server");
        axum::serve(listener, self.router.into_make_service()).await?;
        Ok(())
    }
}

async fn track_request(
    State(state): State<Arc<ApiState>>,
    request: Request,
    next: Next,
) -> Response {
    let route = request.extensions().get::<MatchedPath>().map_or_else(
        || request.uri().path().to_string(),
        |matched| matched.as_str().to_string(),
    );
    let response = next.run(request).await;
    state
        .telemetry
        .inc_http_request(&route, response.status().as_u16());
    response
}
