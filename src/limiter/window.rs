//! Fixed-window request counting per source key.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::broadcast;

/// How often stale windows are swept.
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

/// One counting window. Valid only while `now <= reset_at`; once expired it
/// is treated as absent and recreated on next use.
#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    reset_at: Instant,
}

/// Fixed-window rate limiter keyed by source identity.
///
/// The call that opens a window never exceeds the limit, so traffic aligned
/// at a window boundary can admit up to 2× `max_requests` in a short span —
/// the accepted cost of O(1) state per key.
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    max_requests: u64,
    window: Duration,
}

impl RateLimiter {
    /// `max_requests >= 1` and `window > 0`; enforced by config validation.
    pub fn new(max_requests: u64, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    /// Count one request for `key` and report whether the key is over its
    /// quota in the current window.
    pub fn is_exceeded(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(Window {
                count: 0,
                reset_at: now + self.window,
            });
        let window = entry.value_mut();

        if now > window.reset_at {
            *window = Window {
                count: 1,
                reset_at: now + self.window,
            };
            return false;
        }

        window.count += 1;
        window.count > self.max_requests
    }

    /// Drop windows whose reset time has passed.
    pub fn evict_expired(&self) {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows.retain(|_, window| now <= window.reset_at);
        let dropped = before.saturating_sub(self.windows.len());
        if dropped > 0 {
            tracing::debug!(
                dropped,
                remaining = self.windows.len(),
                "evicted stale rate-limit windows"
            );
        }
    }

    /// Number of currently tracked keys.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Run the periodic eviction sweep until shutdown.
    pub async fn run_eviction(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(EVICTION_INTERVAL);
        // The interval's first tick completes immediately; nothing can be
        // stale yet, so consume it.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => self.evict_expired(),
                _ = shutdown.recv() => break,
            }
        }
    }
}
