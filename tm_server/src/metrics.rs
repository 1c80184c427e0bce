//! Prometheus metrics for monitoring the tournament server.
//!
//! Metrics are exposed in Prometheus text format on their own listener when
//! `METRICS_BIND` is set. Without an installed exporter every call below is a
//! no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tm_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/tournaments/join", 200);
//! metrics::tournament_joins_total(metrics::JoinVia::Code, "already_joined");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// `path` should be the matched route template, not the raw URI.
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

// ============================================================================
// Tournament Metrics
// ============================================================================

/// How a join was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinVia {
    Tournament,
    Code,
}

impl JoinVia {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinVia::Tournament => "tournament",
            JoinVia::Code => "code",
        }
    }
}

/// Increment created tournaments counter.
pub fn tournaments_created_total() {
    metrics::counter!("tournaments_created_total").increment(1);
}

/// Increment join attempts counter; `outcome` is `ok` or an error kind.
pub fn tournament_joins_total(via: JoinVia, outcome: &str) {
    metrics::counter!("tournament_joins_total",
        "via" => via.as_str(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

// ============================================================================
// Chat Metrics
// ============================================================================

/// Increment chat messages counter.
pub fn chat_messages_total() {
    metrics::counter!("chat_messages_total").increment(1);
}

/// Increment contact messages counter.
pub fn contact_messages_total() {
    metrics::counter!("contact_messages_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter_is_noop() {
        http_requests_total("GET", "/health", 200);
        http_request_duration_ms("GET", "/health", 1.5);
        tournaments_created_total();
        tournament_joins_total(JoinVia::Code, "ok");
        chat_messages_total();
        contact_messages_total();
    }

    #[test]
    fn test_join_via_labels() {
        assert_eq!(JoinVia::Tournament.as_str(), "tournament");
        assert_eq!(JoinVia::Code.as_str(), "code");
    }
}
