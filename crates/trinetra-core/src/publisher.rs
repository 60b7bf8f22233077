//! Snapshot fan-out to any number of subscribers.
//!
//! Snapshots travel over a `tokio::sync::broadcast` channel as
//! `Arc<WorldSnapshot>`, so one serialization-ready copy is shared by
//! every receiver. A subscriber that falls more than the channel capacity
//! behind skips straight to the newest snapshots; it never blocks the
//! engines or other subscribers.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use trinetra_types::WorldSnapshot;

/// Sending side of the snapshot channel.
#[derive(Debug, Clone)]
pub struct Publisher {
    tx: broadcast::Sender<Arc<WorldSnapshot>>,
}

impl Publisher {
    /// Create a publisher buffering up to `capacity` snapshots per
    /// subscriber. A zero capacity is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish a snapshot to every current subscriber.
    ///
    /// Returns the number of receivers that got it; 0 when nobody is
    /// listening, which is not an error.
    pub fn publish(&self, snapshot: WorldSnapshot) -> usize {
        self.tx.send(Arc::new(snapshot)).unwrap_or(0)
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Attach a subscription that will yield `initial` first.
    ///
    /// Callers must take `initial` under the same world lock as this call
    /// so no publish can slip between the two.
    pub fn attach(&self, initial: WorldSnapshot) -> Subscription {
        Subscription {
            pending: Some(Arc::new(initial)),
            rx: self.tx.subscribe(),
            skipped: 0,
        }
    }
}

/// Receiving side for one subscriber.
///
/// The first item is always the full snapshot taken at subscription time,
/// followed by every snapshot published afterwards in publish order.
#[derive(Debug)]
pub struct Subscription {
    pending: Option<Arc<WorldSnapshot>>,
    rx: broadcast::Receiver<Arc<WorldSnapshot>>,
    skipped: u64,
}

impl Subscription {
    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the publisher is gone. Lag is absorbed by
    /// skipping to the oldest snapshot still buffered.
    pub async fn next(&mut self) -> Option<Arc<WorldSnapshot>> {
        if let Some(initial) = self.pending.take() {
            return Some(initial);
        }
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(RecvError::Lagged(n)) => self.record_lag(n),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next snapshot if one is ready, without waiting.
    pub fn try_next(&mut self) -> Option<Arc<WorldSnapshot>> {
        if let Some(initial) = self.pending.take() {
            return Some(initial);
        }
        loop {
            match self.rx.try_recv() {
                Ok(snapshot) => return Some(snapshot),
                Err(TryRecvError::Lagged(n)) => self.record_lag(n),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Total snapshots this subscriber has missed through lag.
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }

    fn record_lag(&mut self, n: u64) {
        self.skipped = self.skipped.saturating_add(n);
        tracing::debug!(skipped = n, "Subscriber lagged, skipping to newest snapshots");
    }
}
