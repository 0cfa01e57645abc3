//! Metrics collection and exposition.
//!
//! # Metrics
//! - `neons_resolutions_total` (counter): resolutions by outcome
//! - `neons_rule_commits_total` (counter): committed rule mutations by kind
//! - `neons_store_errors_total` (counter): rejected rule updates
//! - `neons_requests_ignored_total` (counter): requests outside the filter

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(resolved: bool) {
    let outcome = if resolved { "resolved" } else { "unresolved" };
    metrics::counter!("neons_resolutions_total", "outcome" => outcome).increment(1);
}

/// Record a committed mutation (`created`, `replaced`, `error_redirect`).
pub fn record_rule_commit(kind: &'static str) {
    metrics::counter!("neons_rule_commits_total", "kind" => kind).increment(1);
}

pub fn record_store_error() {
    metrics::counter!("neons_store_errors_total").increment(1);
}

pub fn record_request_ignored() {
    metrics::counter!("neons_requests_ignored_total").increment(1);
}
