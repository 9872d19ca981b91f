//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes a minimal set of counters/gauges relevant to Corvid services.

use std::sync::Arc;

use anyhow::Result;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    jobs_enqueued_total: IntCounterVec,
    jobs_completed_total: IntCounterVec,
    jobs_failed_total: IntCounterVec,
    notes_scanned_total: IntCounterVec,
    scan_failures_total: IntCounter,
    queue_depth: IntGauge,
}

/// Snapshot of selected gauges and counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Jobs currently waiting in the background queue.
    pub queue_depth: i64,
    /// Total moderation scan failures observed.
    pub scan_failures_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests received"),
            &["route", "code"],
        )?;
        let jobs_enqueued_total = IntCounterVec::new(
            Opts::new("jobs_enqueued_total", "Background jobs enqueued by kind"),
            &["kind"],
        )?;
        let jobs_completed_total = IntCounterVec::new(
            Opts::new("jobs_completed_total", "Background jobs completed by kind"),
            &["kind"],
        )?;
        let jobs_failed_total = IntCounterVec::new(
            Opts::new("jobs_failed_total", "Background jobs failed by kind"),
            &["kind"],
        )?;
        let notes_scanned_total = IntCounterVec::new(
            Opts::new("notes_scanned_total", "Moderation scans by outcome"),
            &["outcome"],
        )?;
        let scan_failures_total = IntCounter::with_opts(Opts::new(
            "scan_failures_total",
            "Moderation scans that failed to complete",
        ))?;
        let queue_depth = IntGauge::with_opts(Opts::new(
            "queue_depth",
            "Jobs waiting in the background queue",
        ))?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(jobs_enqueued_total.clone()))?;
        registry.register(Box::new(jobs_completed_total.clone()))?;
        registry.register(Box::new(jobs_failed_total.clone()))?;
        registry.register(Box::new(notes_scanned_total.clone()))?;
        registry.register(Box::new(scan_failures_total.clone()))?;
        registry.register(Box::new(queue_depth.clone()))?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                jobs_enqueued_total,
                jobs_completed_total,
                jobs_failed_total,
                notes_scanned_total,
                scan_failures_total,
                queue_depth,
            }),
        })
    }

    /// Count one HTTP request by route and status code.
    pub fn inc_http_request(&self, route: &str, code: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &code.to_string()])
            .inc();
    }

    /// Count one enqueued background job and grow the queue depth gauge.
    pub fn inc_job_enqueued(&self, kind: &str) {
        self.inner
            .jobs_enqueued_total
            .with_label_values(&[kind])
            .inc();
        self.inner.queue_depth.inc();
    }

    /// Count one completed background job and shrink the queue depth gauge.
    pub fn inc_job_completed(&self, kind: &str) {
        self.inner
            .jobs_completed_total
            .with_label_values(&[kind])
            .inc();
        self.inner.queue_depth.dec();
    }

    /// Count one failed background job and shrink the queue depth gauge.
    pub fn inc_job_failed(&self, kind: &str) {
        self.inner
            .jobs_failed_total
            .with_label_values(&[kind])
            .inc();
        self.inner.queue_depth.dec();
    }

    /// Count one moderation scan by outcome label.
    pub fn inc_note_scanned(&self, outcome: &str) {
        self.inner
            .notes_scanned_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Count one moderation scan failure.
    pub fn inc_scan_failure(&self) {
        self.inner.scan_failures_total.inc();
    }

    /// Snapshot the scalar collectors for health reporting.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_depth: self.inner.queue_depth.get(),
            scan_failures_total: self.inner.scan_failures_total.get(),
        }
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding the metric families fails.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.inner.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
