//! Keep-alive heartbeat.
//!
//! Keeps the intercepting process resident by ticking at a fixed interval.
//! It never touches resolution or rules.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

/// Periodic heartbeat task.
#[derive(Debug)]
pub struct KeepAlive {
    interval: Duration,
    beats: Arc<AtomicU64>,
}

impl KeepAlive {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            beats: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shared heartbeat counter.
    pub fn beats(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.beats)
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::debug!(interval_secs = self.interval.as_secs(), "Keep-alive starting");

        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let beat = self.beats.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::trace!(beat, "Keep-alive");
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Keep-alive received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
