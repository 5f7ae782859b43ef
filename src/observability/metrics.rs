//! Metrics collection.
//!
//! # Metrics
//! - `botgate_decisions_total` (counter): decisions by action, reason
//! - `botgate_rate_limited_total` (counter): requests over their window quota
//! - `botgate_rule_sync_total` (counter): sync outcomes
//! - `botgate_telemetry_flushes_total` / `botgate_telemetry_events_total`
//!   (counters): flush outcomes and the fingerprints they carried
//!
//! Counters go through the `metrics` facade; updates are cheap and a host
//! without a recorder pays almost nothing.

/// Count one admission decision.
pub fn record_decision(action: &'static str, reason: &'static str) {
    metrics::counter!("botgate_decisions_total", "action" => action, "reason" => reason)
        .increment(1);
}

/// Count one request over its window quota.
pub fn record_rate_limited() {
    metrics::counter!("botgate_rate_limited_total").increment(1);
}

/// Count a rule-sync outcome: "installed", "stale", "rejected" or "error".
pub fn record_rule_sync(outcome: &'static str) {
    metrics::counter!("botgate_rule_sync_total", "outcome" => outcome).increment(1);
}

/// Count a telemetry flush outcome and the fingerprints it carried.
pub fn record_telemetry_flush(outcome: &'static str, events: usize) {
    metrics::counter!("botgate_telemetry_flushes_total", "outcome" => outcome).increment(1);
    metrics::counter!("botgate_telemetry_events_total", "outcome" => outcome)
        .increment(events as u64);
}
