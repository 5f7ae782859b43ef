//! The decision engine: an ordered policy pipeline over the rule snapshot
//! and the rate-limiter state.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::engine::types::{Decision, DecisionReason, Fingerprint, NormalizedRequest};
use crate::error::Error;
use crate::lifecycle::Shutdown;
use crate::limiter::RateLimiter;
use crate::observability::{logging, metrics};
use crate::rules::defaults;
use crate::rules::store::RuleStore;
use crate::rules::sync::RuleSync;
use crate::telemetry::TelemetryBatcher;

/// Request-admission engine.
///
/// Owns one rule store, one rate limiter and one telemetry batcher, each
/// with its own background task; all are torn down together by
/// [`Engine::shutdown`]. Engine-owned state only — multiple engines in one
/// process keep independent rule lifecycles.
pub struct Engine {
    rules: Arc<RuleStore>,
    limiter: Arc<RateLimiter>,
    telemetry: Arc<TelemetryBatcher>,
    shutdown: Shutdown,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Engine {
    /// Validate the config, build the subsystems and start their background
    /// tasks. Must be called from within a Tokio runtime.
    ///
    /// Fails on a missing credential, an unparseable API URL or zero
    /// rate-limit/interval values; nothing is spawned on failure.
    pub fn new(config: EngineConfig) -> Result<Engine, Error> {
        config.validate()?;
        logging::init(&config.log_level);

        let rules = Arc::new(RuleStore::new(
            defaults::builtin(),
            config.allowed_uas.clone(),
        ));
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit,
            config.rate_limit_window(),
        ));
        let telemetry = Arc::new(TelemetryBatcher::new(
            &config.api_url,
            &config.api_key,
            config.flush_interval(),
            config.buffer_size,
            config.telemetry,
        )?);
        let sync = RuleSync::new(&config.api_url, &config.api_key, config.sync_interval())?;

        let shutdown = Shutdown::new();
        let mut tasks = vec![
            tokio::spawn(sync.run(rules.clone(), shutdown.subscribe())),
            tokio::spawn(limiter.clone().run_eviction(shutdown.subscribe())),
        ];
        if config.telemetry {
            tasks.push(tokio::spawn(telemetry.clone().run(shutdown.subscribe())));
        }

        tracing::info!(
            rate_limit = config.rate_limit,
            telemetry = config.telemetry,
            "admission engine initialized"
        );

        Ok(Engine {
            rules,
            limiter,
            telemetry,
            shutdown,
            tasks: Mutex::new(tasks),
        })
    }

    /// Evaluate a normalized request through the policy pipeline.
    ///
    /// Synchronous and I/O-free. Deterministic given the current rule
    /// snapshot and rate-limiter state; each rule lookup reads whichever
    /// snapshot is current at that instant (swaps only move forward in
    /// version).
    pub fn evaluate(&self, req: &NormalizedRequest) -> Decision {
        // 1. Allow-list override; a block-list match wins on conflict.
        if !req.user_agent.is_empty()
            && self.rules.is_allowed_ua(&req.user_agent)
            && !self.rules.is_blocked_ua(&req.user_agent)
        {
            return self.report(req, Decision::allow_listed());
        }

        // 2. Known bot User-Agent.
        if !req.user_agent.is_empty() && self.rules.is_blocked_ua(&req.user_agent) {
            return self.report(req, Decision::block(DecisionReason::KnownBotUa, 0.95));
        }

        // 3. Known bot source range.
        if !req.ip.is_empty() && self.rules.is_blocked_ip(&req.ip) {
            return self.report(req, Decision::block(DecisionReason::KnownBotIp, 0.90));
        }

        // 4. Per-source rate.
        if !req.ip.is_empty() && self.limiter.is_exceeded(&req.ip) {
            metrics::record_rate_limited();
            return self.report(req, Decision::block(DecisionReason::RateLimit, 0.70));
        }

        // 5. Header shape.
        let score = self.rules.header_anomaly_score(&req.headers);
        if score > self.rules.anomaly_threshold() {
            return self.report(req, Decision::block(DecisionReason::HeaderAnomaly, score));
        }

        self.report(req, Decision::allow())
    }

    /// Report the verdict to telemetry and hand it back. Every branch of the
    /// pipeline ends here — allow or block, the fingerprint is captured.
    fn report(&self, req: &NormalizedRequest, decision: Decision) -> Decision {
        self.telemetry.push(Fingerprint::capture(req));

        let reason = decision.reason.map(|r| r.as_str()).unwrap_or("none");
        metrics::record_decision(decision.action.as_str(), reason);

        if decision.is_block() {
            let ua: String = req.user_agent.chars().take(80).collect();
            tracing::debug!(ip = %req.ip, reason, ua = %ua, "request blocked");
        }

        decision
    }

    /// The rule store backing this engine.
    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Stop all background tasks and drop buffered telemetry. No rule-sync
    /// or telemetry request is issued after this returns. Idempotent.
    pub async fn shutdown(&self) {
        self.shutdown.trigger();

        let tasks = std::mem::take(&mut *self.tasks.lock().expect("engine task list mutex poisoned"));
        for task in tasks {
            let _ = task.await;
        }

        self.telemetry.clear();
        tracing::info!("admission engine stopped");
    }
}
