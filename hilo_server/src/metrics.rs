//! Prometheus metrics for monitoring game server health.
//!
//! Metrics are exposed in Prometheus text format on a dedicated scrape
//! address configured via `METRICS_BIND`.

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

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Increment total WebSocket connections counter.
pub fn websocket_connections_total() {
    metrics::counter!("websocket_connections_total").increment(1);
}

/// Increment WebSocket messages sent counter.
pub fn websocket_messages_sent() {
    metrics::counter!("websocket_messages_sent").increment(1);
}

/// Increment WebSocket messages received counter.
pub fn websocket_messages_received() {
    metrics::counter!("websocket_messages_received").increment(1);
}

// ============================================================================
// Game Metrics
// ============================================================================

/// Set current active rooms count.
pub fn active_rooms(count: usize) {
    metrics::gauge!("active_rooms").set(count as f64);
}

/// Increment games started counter.
pub fn games_started_total() {
    metrics::counter!("games_started_total").increment(1);
}

/// Increment resolved challenges counter, labelled by result.
pub fn challenges_resolved_total(result: &str) {
    metrics::counter!("challenges_resolved_total",
        "result" => result.to_string()
    )
    .increment(1);
}

/// Count cards banked from the pot pile.
pub fn cards_collected_total(count: usize) {
    metrics::counter!("cards_collected_total").increment(count as u64);
}
