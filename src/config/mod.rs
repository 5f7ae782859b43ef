//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! host application builds EngineConfig (or deserializes it)
//!     → validate() (semantic checks; credential required)
//!     → Engine::new consumes it
//!     → sections handed to rule sync, rate limiter, telemetry
//! ```
//!
//! Loading config from files and hot reload belong to the embedding host,
//! not to this crate.

pub mod schema;

pub use schema::EngineConfig;
