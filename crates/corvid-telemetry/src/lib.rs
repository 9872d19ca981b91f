//! Telemetry primitives shared across the Corvid workspace.
//!
//! This crate centralises logging setup, the Prometheus metrics registry,
//! and the request-id propagation layers so every service surface adopts a
//! consistent observability story.

mod init;
mod layers;
mod metrics;

pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
pub use layers::{REQUEST_ID_HEADER, propagate_request_id_layer, set_request_id_layer};
pub use metrics::{Metrics, MetricsSnapshot};
