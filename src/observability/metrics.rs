//! Metrics collection and exposition.
//!
//! # Metrics
//! - `nanoroute_requests_total` (counter): requests by method, status, pattern
//! - `nanoroute_request_duration_seconds` (histogram): latency distribution
//!
//! Unmatched requests are recorded with pattern `none`.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one served request.
pub fn record_request(method: &str, status: u16, pattern: &str, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    let pattern = pattern.to_string();

    metrics::counter!(
        "nanoroute_requests_total",
        "method" => method.clone(),
        "status" => status.clone(),
        "pattern" => pattern.clone()
    )
    .increment(1);

    metrics::histogram!(
        "nanoroute_request_duration_seconds",
        "method" => method,
        "status" => status,
        "pattern" => pattern
    )
    .record(start.elapsed().as_secs_f64());
}
