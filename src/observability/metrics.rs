//! Metric recording for the probe path.
//!
//! # Metrics
//! - `selector_probe_rtt_seconds` (histogram): measured probe RTT, by server
//! - `selector_probe_failures_total` (counter): probes that contributed no
//!   measurement, by server
//! - `selector_rounds_won_total` (counter): probe rounds won, by server

use std::time::Duration;

/// Record a successful probe's round-trip time.
pub fn record_probe_rtt(server: &str, rtt: Duration) {
    metrics::histogram!("selector_probe_rtt_seconds", "server" => server.to_string())
        .record(rtt.as_secs_f64());
}

/// Record a probe that contributed no measurement.
pub fn record_probe_failure(server: &str) {
    metrics::counter!("selector_probe_failures_total", "server" => server.to_string())
        .increment(1);
}

/// Record a server being adopted as a round's winner.
pub fn record_round_winner(server: &str) {
    metrics::counter!("selector_rounds_won_total", "server" => server.to_string()).increment(1);
}
