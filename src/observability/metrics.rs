//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, service
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_upstream_failures_total` (counter): timeouts and connection
//!   failures by service

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener. Failure to bind is
/// logged, not fatal: the gateway serves traffic without metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one terminal response.
pub fn record_request(method: &str, status: u16, service: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("service", service.to_string()),
    ];
    metrics::counter!("gateway_requests_total", &labels).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record an upstream transport failure (timeout or connect error).
pub fn record_upstream_failure(service: &str, kind: &'static str) {
    let labels = [("service", service.to_string()), ("kind", kind.to_string())];
    metrics::counter!("gateway_upstream_failures_total", &labels).increment(1);
}
