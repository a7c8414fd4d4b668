//! Observability Metrics
//!
//! Prometheus metrics for the HTTP API.

use std::sync::OnceLock;

use ::metrics::{counter, histogram};
use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Global Prometheus handle
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize metrics recorder
///
/// Must be called once at startup before recording any metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_default_metrics();

    METRICS_HANDLE.get_or_init(|| handle.clone());
    Ok(handle)
}

/// Get the global metrics handle
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

fn register_default_metrics() {
    counter!("civic_intel_requests_total", "endpoint" => "voicemails").absolute(0);
    counter!("civic_intel_requests_total", "endpoint" => "insights").absolute(0);
    counter!("civic_intel_requests_total", "endpoint" => "workflow").absolute(0);

    counter!("civic_intel_errors_total", "type" => "database").absolute(0);
    counter!("civic_intel_errors_total", "type" => "workflow").absolute(0);

    counter!("civic_intel_workflow_runs_total", "outcome" => "success").absolute(0);
    counter!("civic_intel_workflow_runs_total", "outcome" => "failure").absolute(0);
}

/// Record request to endpoint
pub fn record_request(endpoint: &'static str) {
    counter!("civic_intel_requests_total", "endpoint" => endpoint).increment(1);
}

/// Record storage round-trip time for one listing
pub fn record_query_latency(duration_secs: f64) {
    histogram!("civic_intel_query_duration_seconds").record(duration_secs);
}

/// Record workflow trigger outcome
pub fn record_workflow_run(outcome: &'static str) {
    counter!("civic_intel_workflow_runs_total", "outcome" => outcome).increment(1);
}

/// Record error by type
pub fn record_error(error_type: &'static str) {
    counter!("civic_intel_errors_total", "type" => error_type).increment(1);
}

/// Metrics endpoint handler
///
/// Returns Prometheus-formatted metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    match get_metrics_handle() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "Metrics not initialized".to_string(),
        ),
    }
}
