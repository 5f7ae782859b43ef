//! Decision engine.
//!
//! # Data Flow
//! ```text
//! adapter normalizes the native request
//!     → Engine::evaluate
//!         1. UA allow list (a block-list match wins on conflict)
//!         2. UA block list
//!         3. CIDR block list
//!         4. per-source rate window
//!         5. header-shape anomaly score vs threshold
//!     → Decision { action, reason, confidence }
//!     → fingerprint pushed to telemetry (fire-and-forget)
//!     → adapter translates the decision into a response
//! ```
//!
//! # Design Decisions
//! - evaluate() is synchronous and performs no I/O
//! - first matching policy wins; every branch reports a fingerprint
//! - rule lookups read whichever snapshot is current at that instant

pub mod evaluator;
pub mod types;

pub use evaluator::Engine;
pub use types::{Action, BlockContext, Decision, DecisionReason, Fingerprint, NormalizedRequest};
