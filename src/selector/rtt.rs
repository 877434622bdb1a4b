//! Latency-based selection.
//!
//! # Responsibilities
//! - Hold the current server group and the currently selected server
//! - Re-probe the group on a fixed interval in the background
//! - Collapse overlapping probe rounds into one (single-flight guard)
//!
//! # Design Decisions
//! - The selection is an atomically swapped `Arc`: one writer (the
//!   round coordinator), lock-free readers, no torn reads
//! - The winner of a round is the first server whose probe succeeds,
//!   not the one with the smallest measured RTT
//! - A round in which no probe succeeds keeps the previous selection
//!   instead of blocking; the guard is always released

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time;

use crate::error::Result;
use crate::observability::metrics;
use crate::selector::{probe, Selector};
use crate::server::{Server, ServerDescriptor, ServerGroup};

/// Delay between scheduled probe rounds.
const PROBE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Guard flag states: at most one probe round runs at a time.
const IDLE: u32 = 0;
const PROBING: u32 = 1;

/// Selector that prefers the server answering a latency probe first.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct RttSelector {
    inner: Arc<Inner>,
}

struct Inner {
    group: ArcSwap<ServerGroup>,
    selected: ArcSwap<Server>,
    /// Single-flight latch; [`IDLE`] or [`PROBING`].
    probing: AtomicU32,
    shutdown: broadcast::Sender<()>,
    /// Signalled after every completed round so the scheduler restarts
    /// its interval from the full duration.
    timer_reset: watch::Sender<()>,
}

impl RttSelector {
    /// Create the selector, seed the selection from the group's first
    /// server, start the background scheduler and kick off an initial
    /// probe round.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(group: ServerGroup) -> Self {
        let (shutdown, _) = broadcast::channel(1);
        let (timer_reset, _) = watch::channel(());
        let selected = group.first();

        let selector = Self {
            inner: Arc::new(Inner {
                group: ArcSwap::from_pointee(group),
                selected: ArcSwap::new(selected),
                probing: AtomicU32::new(IDLE),
                shutdown,
                timer_reset,
            }),
        };

        let scheduler = selector.clone();
        tokio::spawn(async move { scheduler.run().await });

        let starter = selector.clone();
        tokio::spawn(async move { starter.probe_round().await });

        selector
    }

    /// Scheduler loop: race the interval timer against the shutdown
    /// signal and timer resets, whichever fires first.
    ///
    /// Shutdown is only observed while waiting, never mid-round.
    async fn run(self) {
        let mut shutdown = self.inner.shutdown.subscribe();
        let mut timer_reset = self.inner.timer_reset.subscribe();
        loop {
            tokio::select! {
                _ = time::sleep(PROBE_INTERVAL) => {
                    self.probe_round().await;
                }
                res = timer_reset.changed() => {
                    // A round finished out of band; restart the full interval.
                    if res.is_err() {
                        break;
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("latency selector scheduler stopping");
                    break;
                }
            }
        }
    }

    /// One probe round: fan out one probe per server, adopt the first
    /// winner. No-op when another round is already in flight.
    async fn probe_round(&self) {
        if self
            .inner
            .probing
            .compare_exchange(IDLE, PROBING, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let group = self.inner.group.load_full();
        tracing::debug!(
            group = %group.name(),
            servers = group.servers().len(),
            "latency probe round starting"
        );

        let (tx, mut rx) = mpsc::channel::<Arc<Server>>(1);
        for server in group.servers() {
            if let Err(e) = server.descriptor() {
                tracing::debug!(server = %server.name(), error = %e, "skipping unresolvable server");
                continue;
            }
            let server = server.clone();
            let tx = tx.clone();
            tokio::spawn(async move { probe::probe_server(server, tx).await });
        }
        // The coordinator keeps no sender: once every probe has reported
        // without publishing, `recv` resolves to `None` instead of
        // waiting forever.
        drop(tx);

        match rx.recv().await {
            Some(winner) => {
                tracing::info!(
                    group = %group.name(),
                    server = %winner.name(),
                    rtt_ms = winner.rtt().as_millis() as u64,
                    "latency probe selected server"
                );
                metrics::record_round_winner(winner.name());
                self.inner.selected.store(winner);
            }
            None => {
                tracing::warn!(
                    group = %group.name(),
                    "no server answered the latency probe, keeping previous selection"
                );
            }
        }

        let _ = self.inner.timer_reset.send(());
        let _ = self
            .inner
            .probing
            .compare_exchange(PROBING, IDLE, Ordering::AcqRel, Ordering::Relaxed);
    }
}

#[async_trait]
impl Selector for RttSelector {
    fn get(&self) -> Result<ServerDescriptor> {
        self.inner.selected.load().descriptor()
    }

    fn current(&self) -> Arc<Server> {
        self.inner.selected.load_full()
    }

    /// Selection is automatic for this strategy; manual override is
    /// accepted as a no-op.
    fn select(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    /// Errors inside the round are logged, not propagated; a refresh
    /// issued while a round is in flight collapses into that round.
    async fn refresh(&self) -> Result<()> {
        self.probe_round().await;
        Ok(())
    }

    fn reset(&self, group: ServerGroup) -> Result<()> {
        let group = Arc::new(group);
        self.inner.selected.store(group.first());
        self.inner.group.store(group);

        let selector = self.clone();
        tokio::spawn(async move { selector.probe_round().await });
        Ok(())
    }

    fn destroy(&self) {
        let _ = self.inner.shutdown.send(());
    }
}
