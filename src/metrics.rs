//! Performance metrics collection for buncher
//!
//! This module provides functionality for collecting and exposing performance metrics
//! in Prometheus format.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the metrics collection system
pub fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    // Create a Prometheus exporter
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    Ok(())
}

/// Record a successful query execution
pub fn record_query(duration_ms: f64, rows: usize) {
    histogram!("buncher.query.duration_ms").record(duration_ms);
    histogram!("buncher.query.rows").record(rows as f64);
}

/// Record a failed query execution
pub fn record_query_error(kind: &'static str) {
    counter!("buncher.query.errors", "kind" => kind).increment(1);
}

/// Record a request rejected before reaching the store
pub fn record_rejected_request() {
    counter!("buncher.request.rejected").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter() {
        // With no recorder installed these are no-ops
        record_query(1.5, 10);
        record_query_error("query_execution");
        record_rejected_request();
    }
}
