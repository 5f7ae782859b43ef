//! Request, decision and fingerprint types.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Framework-agnostic view of an inbound request.
///
/// Produced by an adapter (see [`crate::adapter`]); immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    /// Client IP: dotted-quad, or whatever literal the transport exposed.
    pub ip: String,

    /// Raw User-Agent header value; empty when absent.
    pub user_agent: String,

    /// Header map, names lower-cased, duplicate values joined with ", ".
    pub headers: HashMap<String, String>,

    /// Header names in the order they arrived.
    pub header_names: Vec<String>,

    /// Request path.
    pub path: String,

    /// HTTP method.
    pub method: String,
}

/// Verdict action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Allow,
    Block,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Allow => "allow",
            Action::Block => "block",
        }
    }
}

/// Why a verdict was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// UA matched the allow list without a block-list match.
    AllowedUa,
    /// UA matched the block list.
    KnownBotUa,
    /// Source IP fell inside a blocked CIDR range.
    KnownBotIp,
    /// Source exceeded its request quota for the current window.
    RateLimit,
    /// Header anomaly score exceeded the configured threshold.
    HeaderAnomaly,
}

impl DecisionReason {
    /// Stable tag used in logs and by telemetry consumers.
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionReason::AllowedUa => "allowed_ua",
            DecisionReason::KnownBotUa => "known_bot_ua",
            DecisionReason::KnownBotIp => "known_bot_ip",
            DecisionReason::RateLimit => "rate_limit",
            DecisionReason::HeaderAnomaly => "header_anomaly",
        }
    }
}

/// Outcome of evaluating one request. Fresh per request, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub reason: Option<DecisionReason>,
    /// Confidence in [0, 1]; present on blocks.
    pub confidence: Option<f64>,
}

impl Decision {
    pub(crate) fn allow() -> Self {
        Self {
            action: Action::Allow,
            reason: None,
            confidence: None,
        }
    }

    pub(crate) fn allow_listed() -> Self {
        Self {
            action: Action::Allow,
            reason: Some(DecisionReason::AllowedUa),
            confidence: None,
        }
    }

    pub(crate) fn block(reason: DecisionReason, confidence: f64) -> Self {
        Self {
            action: Action::Block,
            reason: Some(reason),
            confidence: Some(confidence),
        }
    }

    pub fn is_block(&self) -> bool {
        self.action == Action::Block
    }
}

/// Write-once capture of a request for telemetry export.
///
/// Never read back by the decision path. Serializes to the collector's
/// camelCase wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fingerprint {
    pub ip: String,
    pub user_agent: String,
    /// Header names in received order.
    pub header_order: Vec<String>,
    pub headers: HashMap<String, String>,
    pub path: String,
    pub method: String,
    /// Capture time, epoch milliseconds.
    pub ts: u64,
}

impl Fingerprint {
    /// Capture a request at the current wall-clock time.
    pub fn capture(req: &NormalizedRequest) -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        Self {
            ip: req.ip.clone(),
            user_agent: req.user_agent.clone(),
            header_order: req.header_names.clone(),
            headers: req.headers.clone(),
            path: req.path.clone(),
            method: req.method.clone(),
            ts,
        }
    }
}

/// Context handed to a block hook at the adapter boundary.
#[derive(Debug, Clone)]
pub struct BlockContext {
    pub fingerprint: Fingerprint,
    pub decision: Decision,
}
