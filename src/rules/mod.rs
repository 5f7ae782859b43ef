//! Rule management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in ruleset (version 1)
//!     → RuleStore (compiled snapshot behind an atomic swap)
//!     ← RuleSync background task (GET /v1/rules, version-gated install)
//!
//! Request path:
//!     Engine → RuleStore::is_*_ua / is_blocked_ip / header_anomaly_score
//!     (lock-free snapshot reads; sync failures keep last-known-good)
//! ```

pub mod cidr;
pub mod defaults;
pub mod store;
pub mod sync;
pub mod types;

pub use store::RuleStore;
pub use types::{CompiledRules, HeaderPattern, RuleSet};
