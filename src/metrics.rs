//! Prometheus metrics for HTTP traffic and incident activity.
//!
//! # Metrics Families
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `http_requests_total` | Counter | `method`, `endpoint`, `http_status` |
//! | `http_request_duration_seconds` | Histogram | `method`, `endpoint` |
//! | `incidents_created_total` | Counter | (none) |
//!
//! The HTTP families are recorded by [`track_http`], a middleware layered
//! over the whole router. The endpoint label uses the matched route template
//! (`/api/incident/:incident_id`), not the raw request path, so label
//! cardinality stays bounded. `incidents_created_total` increments exactly
//! once per successful create, from the report handler.

use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{
    Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use thiserror::Error;

/// Histogram buckets for HTTP request latency (in seconds).
const HTTP_LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Failed to register a metric with Prometheus.
    #[error("failed to register metric: {0}")]
    RegistrationFailed(#[from] prometheus::Error),

    /// Failed to encode metrics output.
    #[error("failed to encode metrics: {0}")]
    EncodingFailed(String),
}

/// Service metrics, registered against a private registry.
///
/// All collectors use interior mutability and are safe to share across
/// concurrent requests; the struct is `Clone`, `Send`, and `Sync`.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    http_requests_total: CounterVec,
    http_request_duration_seconds: HistogramVec,
    incidents_created_total: Counter,
}

impl Metrics {
    /// Creates the metric families and registers them.
    ///
    /// # Errors
    ///
    /// Returns an error if any metric fails to register (e.g., duplicate name).
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests"),
            &["method", "endpoint", "http_status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Latency of HTTP requests",
            )
            .buckets(HTTP_LATENCY_BUCKETS.to_vec()),
            &["method", "endpoint"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        let incidents_created_total = Counter::with_opts(Opts::new(
            "incidents_created_total",
            "Total number of incidents created",
        ))?;
        registry.register(Box::new(incidents_created_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            incidents_created_total,
        })
    }

    /// Record one completed HTTP request.
    pub fn record_http(&self, method: &str, endpoint: &str, status: u16, seconds: f64) {
        let status = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, endpoint, &status])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, endpoint])
            .observe(seconds);
    }

    /// Count one successfully created incident.
    pub fn incident_created(&self) {
        self.incidents_created_total.inc();
    }

    /// Export all families in Prometheus text format.
    pub fn encode_text(&self) -> Result<String, MetricsError> {
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buffer)
            .map_err(|e| MetricsError::EncodingFailed(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| MetricsError::EncodingFailed(e.to_string()))
    }
}

/// Middleware recording request count and latency for every response.
pub async fn track_http(State(metrics): State<Metrics>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    // Label by route template; fall back to the raw path for unmatched routes
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let start = Instant::now();
    let response = next.run(request).await;

    metrics.record_http(
        &method,
        &endpoint,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}
