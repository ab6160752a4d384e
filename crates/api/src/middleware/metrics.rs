//! Prometheus metrics middleware.
//!
//! Provides HTTP request/response metrics collection and export, plus the
//! booking counters recorded by route handlers and sweep jobs.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::ReservationState;
use domain::services::SweepReport;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

/// Counter of reservation state changes, labelled by target state.
pub const RESERVATION_TRANSITIONS_METRIC: &str = "reservation_transitions_total";

/// Counter of sweep outcomes, labelled by sweep and outcome.
pub const SWEEP_RESULTS_METRIC: &str = "reservation_sweep_results_total";

/// Middleware to record HTTP request metrics.
///
/// Records the following metrics:
/// - `http_requests_total`: Counter with labels (method, path, status)
/// - `http_request_duration_seconds`: Histogram with labels (method, path)
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();
    let method_str = method_to_str(&method);

    counter!(
        "http_requests_total",
        "method" => method_str,
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method_str,
        "path" => path
    )
    .record(duration);

    response
}

/// Convert HTTP method to string for metric labels.
fn method_to_str(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        _ => "OTHER",
    }
}

/// Counts one reservation entering `to`.
pub fn record_reservation_transition(to: ReservationState) {
    counter!(RESERVATION_TRANSITIONS_METRIC, "to" => to.as_str()).increment(1);
}

/// Counts the outcome of one sweep pass. `sweep` is `expired` or `no_show`.
pub fn record_sweep(sweep: &'static str, report: &SweepReport) {
    counter!(SWEEP_RESULTS_METRIC, "sweep" => sweep, "outcome" => "transitioned")
        .increment(report.transitioned.len() as u64);
    counter!(SWEEP_RESULTS_METRIC, "sweep" => sweep, "outcome" => "skipped")
        .increment(report.skipped as u64);
    counter!(SWEEP_RESULTS_METRIC, "sweep" => sweep, "outcome" => "failed")
        .increment(report.failed.len() as u64);
}

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Handler for /metrics endpoint that returns Prometheus text format.
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}

/// Installs the global Prometheus recorder.
///
/// Must be called once during startup before any metrics are recorded.
/// Later calls are no-ops.
pub fn init_metrics() -> Result<(), BuildError> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0])?
        .install_recorder()?;

    let _ = PROMETHEUS_HANDLE.set(handle);
    Ok(())
}
