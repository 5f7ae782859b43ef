//! Atomic rule snapshot owned by the engine.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::rules::types::{CompiledRules, RuleSet};

/// Holds the current compiled ruleset behind an atomic swap.
///
/// Readers on the request path load the snapshot lock-free; concurrent
/// readers never observe a torn mix of old and new fields. Only the sync
/// task writes. The store is engine-owned, not process-global, so multiple
/// engines in one process keep independent rule lifecycles.
pub struct RuleStore {
    current: ArcSwap<CompiledRules>,
    /// Config-supplied always-allow substrings, re-merged on every install.
    extra_allowed: Vec<String>,
}

impl RuleStore {
    pub fn new(initial: RuleSet, extra_allowed: Vec<String>) -> Self {
        let compiled = CompiledRules::compile(initial, &extra_allowed);
        Self {
            current: ArcSwap::from_pointee(compiled),
            extra_allowed,
        }
    }

    /// Read-only handle to the current snapshot.
    pub fn current(&self) -> Arc<CompiledRules> {
        self.current.load_full()
    }

    /// Install a fetched rule document.
    ///
    /// Returns `false` (and discards the document) unless its version is
    /// strictly greater than the current snapshot's. Replacement is a single
    /// pointer swap.
    pub fn install(&self, fetched: RuleSet) -> bool {
        if fetched.version <= self.current.load().version() {
            return false;
        }
        let compiled = CompiledRules::compile(fetched, &self.extra_allowed);
        self.current.store(Arc::new(compiled));
        true
    }

    // Pass-throughs used by the engine. Each call reads whichever snapshot
    // is current at that instant; swaps only move forward in version.

    pub fn is_allowed_ua(&self, ua: &str) -> bool {
        self.current.load().is_allowed_ua(ua)
    }

    pub fn is_blocked_ua(&self, ua: &str) -> bool {
        self.current.load().is_blocked_ua(ua)
    }

    pub fn is_blocked_ip(&self, ip: &str) -> bool {
        self.current.load().is_blocked_ip(ip)
    }

    pub fn header_anomaly_score(
        &self,
        headers: &std::collections::HashMap<String, String>,
    ) -> f64 {
        self.current.load().header_anomaly_score(headers)
    }

    pub fn anomaly_threshold(&self) -> f64 {
        self.current.load().anomaly_threshold()
    }
}
