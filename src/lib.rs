//! botgate — in-process request-admission engine.
//!
//! For every inbound HTTP request the engine renders a fast allow/block
//! decision from identity signals (User-Agent, source IP, header shape) and
//! per-source request rate, without a network round trip on the request path.
//!
//! # Architecture Overview
//!
//! ```text
//!   host server ──▶ adapter (axum middleware)
//!                      │ NormalizedRequest
//!                      ▼
//!                ┌──────────────┐      ┌─────────────┐
//!                │    Engine    │─────▶│  RuleStore  │◀── rule sync task
//!                │  (pipeline)  │      ├─────────────┤
//!                │              │─────▶│ RateLimiter │◀── eviction task
//!                └──────┬───────┘      └─────────────┘
//!                       │ Fingerprint
//!                       ▼
//!                TelemetryBatcher ────▶ collector      ◀── flush task
//! ```
//!
//! Rule refresh, window eviction and telemetry export run on background
//! tasks owned by the engine and fail open: the decision path never waits on
//! the network and never observes their errors.

// Core subsystems
pub mod engine;
pub mod limiter;
pub mod rules;
pub mod telemetry;

// Boundary
pub mod adapter;
pub mod config;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::EngineConfig;
pub use engine::{
    Action, BlockContext, Decision, DecisionReason, Engine, Fingerprint, NormalizedRequest,
};
pub use error::Error;
pub use rules::{HeaderPattern, RuleSet};
