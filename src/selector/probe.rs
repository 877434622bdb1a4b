//! Single latency probe.
//!
//! # Responsibilities
//! - Open a transport connection to the fixed probe target through one
//!   server
//! - Time a minimal HTTP exchange against a no-content endpoint
//! - Record the measured RTT on the server and publish first successes
//!
//! # Design Decisions
//! - The probe target and request are fixed; probing measures the path
//!   through the server, not the target itself
//! - Publishing is best-effort into a single-slot channel: the first
//!   successful probe wins the round, later ones are dropped

use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::observability::metrics;
use crate::server::{Protocol, Server, Target};

/// Well-known probe host answering 204 on the probe path.
const PROBE_HOST: &str = "www.gstatic.com";
const PROBE_PORT: u16 = 80;

/// Minimal no-content probe exchange.
const PROBE_REQUEST: &[u8] = b"GET /generate_204 HTTP/1.1\r\nHost: www.gstatic.com\r\n\r\n";

/// Response bytes read per probe; the status code sits at bytes 9..12
/// of the status line.
const PROBE_READ_LEN: usize = 128;
const STATUS_RANGE: std::ops::Range<usize> = 9..12;
const STATUS_NO_CONTENT: &[u8] = b"204";

/// Probe one server and publish it on `winner` if it answers first.
///
/// Every failure path ends the probe without publishing; failures are
/// logged, never propagated. The connection closes on every exit path
/// when the stream drops.
pub(crate) async fn probe_server(server: Arc<Server>, winner: mpsc::Sender<Arc<Server>>) {
    let target = Target::new(Protocol::Http, PROBE_HOST, PROBE_PORT);

    let mut conn = match server.connect(&target).await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::debug!(server = %server.name(), error = %e, "probe connect failed");
            metrics::record_probe_failure(server.name());
            return;
        }
    };

    let start = Instant::now();
    if let Err(e) = conn.write_all(PROBE_REQUEST).await {
        tracing::debug!(server = %server.name(), error = %e, "probe write failed");
        metrics::record_probe_failure(server.name());
        server.clear_rtt();
        return;
    }

    let mut buf = [0u8; PROBE_READ_LEN];
    // Clean end-of-stream shows up as a short read and fails the
    // classification below, same as any other read failure.
    let n = match conn.read(&mut buf).await {
        Ok(n) => n,
        Err(e) => {
            tracing::debug!(server = %server.name(), error = %e, "probe read failed");
            metrics::record_probe_failure(server.name());
            server.clear_rtt();
            return;
        }
    };

    if n >= STATUS_RANGE.end && &buf[STATUS_RANGE] == STATUS_NO_CONTENT {
        let rtt = start.elapsed();
        server.set_rtt(rtt);
        metrics::record_probe_rtt(server.name(), rtt);
        tracing::debug!(
            server = %server.name(),
            rtt_ms = rtt.as_millis() as u64,
            "probe succeeded"
        );
        let _ = winner.try_send(server);
    } else {
        server.clear_rtt();
        metrics::record_probe_failure(server.name());
        tracing::debug!(server = %server.name(), "probe returned unexpected response");
    }
}
