//! Background-task lifecycle.
//!
//! The engine owns three background tasks (rule sync, window eviction,
//! telemetry flush). All of them subscribe to one shutdown broadcast and
//! are joined on teardown, so no timer or network call outlives the engine.

pub mod shutdown;

pub use shutdown::Shutdown;
