//! Prometheus metrics for monitoring server health and traffic.
//!
//! Metrics are exposed in Prometheus text format on a dedicated scrape
//! listener (configured via `METRICS_BIND`).
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: request counts, duration, status codes
//! - **Auth Metrics**: registrations, login attempts, token refreshes
//! - **Domain Metrics**: posts created, messages sent

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

/// Record an HTTP request with method, path, and status labels.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

/// Increment the registrations counter.
pub fn registrations_total(success: bool) {
    metrics::counter!("registrations_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment the login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment the token refresh counter.
pub fn token_refreshes_total(success: bool) {
    metrics::counter!("token_refreshes_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment the posts created counter.
pub fn posts_created_total() {
    metrics::counter!("posts_created_total").increment(1);
}

/// Increment the chat messages sent counter.
pub fn chat_messages_sent_total() {
    metrics::counter!("chat_messages_sent_total").increment(1);
}
