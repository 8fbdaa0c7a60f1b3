//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): forwarded requests by pool, method, status, backend
//! - `gateway_request_duration_seconds` (histogram): time to upstream response headers
//! - `gateway_pool_exhausted_total` (counter): requests rejected with no live backend
//! - `gateway_backend_up` (gauge): 1=alive, 0=dead
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(pool: &str, method: &str, status: u16, backend: &str, start: Instant) {
    let labels = [
        ("pool", pool.to_string()),
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("backend", backend.to_string()),
    ];
    metrics::counter!("gateway_requests_total", &labels).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_pool_exhausted(pool: &str) {
    metrics::counter!("gateway_pool_exhausted_total", "pool" => pool.to_string()).increment(1);
}

pub fn record_backend_health(pool: &str, backend: &str, alive: bool) {
    metrics::gauge!(
        "gateway_backend_up",
        "pool" => pool.to_string(),
        "backend" => backend.to_string()
    )
    .set(if alive { 1.0 } else { 0.0 });
}
