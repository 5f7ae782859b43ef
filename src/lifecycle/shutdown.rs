//! Shutdown coordination for the engine's background tasks.

use tokio::sync::broadcast;

/// Broadcast used to stop the rule-sync, eviction and telemetry-flush tasks
/// together.
///
/// Each long-running loop holds a receiver and selects on it against its
/// ticker.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver for one background task to select on.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal all subscribed tasks to stop. Safe to call more than once.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
