//! Decision telemetry subsystem.
//!
//! # Data Flow
//! ```text
//! Engine::evaluate → Fingerprint::capture → TelemetryBatcher::push
//!     (append to in-process buffer; O(1), never blocks, never fails)
//!
//! Background flush task:
//!     timer tick or buffer-full signal
//!     → snapshot + clear buffer
//!     → POST /v1/fingerprints { events: [...] }
//!     → failures logged, batch dropped (never retried)
//! ```
//!
//! Strictly best-effort: nothing in this subsystem can affect request
//! handling.

pub mod batcher;

pub use batcher::TelemetryBatcher;
