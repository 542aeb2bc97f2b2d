//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): routed requests by outcome
//! - `router_attempts_total` (counter): backend attempts by backend, outcome
//! - `router_attempt_duration_seconds` (histogram): attempt latency by backend
//! - `router_rate_limited_total` (counter): candidates skipped for rate limit
//! - `router_backend_health` (gauge): 1=healthy, 0=unhealthy
//!
//! Without an installed recorder every call is a no-op.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(outcome: &'static str) {
    metrics::counter!("router_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_attempt(backend: &str, outcome: &'static str, elapsed: Duration) {
    metrics::counter!(
        "router_attempts_total",
        "backend" => backend.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("router_attempt_duration_seconds", "backend" => backend.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_rate_limited(backend: &str) {
    metrics::counter!("router_rate_limited_total", "backend" => backend.to_string()).increment(1);
}

pub fn record_backend_health(backend: &str, healthy: bool) {
    metrics::gauge!("router_backend_health", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
