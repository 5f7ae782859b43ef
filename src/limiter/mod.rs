//! Per-source rate limiting.
//!
//! # Data Flow
//! ```text
//! Engine::evaluate
//!     → RateLimiter::is_exceeded(source key)
//!         (fixed-window counter per key, O(1) state)
//!
//! Background:
//!     eviction task drops expired windows every 60s,
//!     bounding memory to the number of active keys
//! ```

pub mod window;

pub use window::RateLimiter;
