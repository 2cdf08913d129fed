//! Prometheus metrics for dashboard synchronization.

use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};

use crate::events::build::EventKind;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    if let Err(e) = builder.install() {
        tracing::warn!("Failed to install Prometheus exporter: {}", e);
    } else {
        tracing::info!("Prometheus exporter listening on {}", addr);
    }
}

/// Record an accepted build event.
pub fn event_received(kind: EventKind) {
    counter!("dashboard_events_total", "event" => kind.as_str()).increment(1);
}

/// Record an event rejected before reaching the store.
pub fn event_rejected(reason: &'static str) {
    counter!("dashboard_events_rejected_total", "reason" => reason).increment(1);
}

/// Record a log delta the store had no target for.
pub fn log_delta_dropped(reason: &'static str) {
    counter!("dashboard_log_deltas_dropped_total", "reason" => reason).increment(1);
}

/// Record how long a finished build ran.
pub fn build_duration(seconds: f64) {
    histogram!("dashboard_build_duration_seconds").record(seconds);
}

/// Record render intents emitted by a binding.
pub fn intents_rendered(binding: &'static str, count: usize) {
    if count > 0 {
        counter!("dashboard_render_intents_total", "binding" => binding).increment(count as u64);
    }
}

/// Set store size gauges.
pub fn store_gauges(repositories: usize, flashing: usize) {
    gauge!("dashboard_repositories").set(repositories as f64);
    gauge!("dashboard_flashing_repositories").set(flashing as f64);
}
