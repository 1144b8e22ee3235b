//! Metrics collection and exposition.
//!
//! # Metrics
//! - `multisend_transfers_total` (counter): per-recipient sends by network, result
//! - `multisend_batches_total` (counter): finished batches by network, status
//! - `multisend_http_requests_total` (counter): API requests by route, status
//! - `multisend_http_request_duration_seconds` (histogram): API latency
//!
//! Without an installed recorder every call is a no-op.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_transfer(network: &str, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    ::metrics::counter!(
        "multisend_transfers_total",
        "network" => network.to_string(),
        "result" => result
    )
    .increment(1);
}

pub fn record_batch(network: &str, status: &'static str) {
    ::metrics::counter!(
        "multisend_batches_total",
        "network" => network.to_string(),
        "status" => status
    )
    .increment(1);
}

pub fn record_http_request(route: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "multisend_http_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "multisend_http_request_duration_seconds",
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
