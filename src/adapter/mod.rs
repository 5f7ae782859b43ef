//! Framework adapters.
//!
//! An adapter owns the boundary between a host framework's native request
//! and the engine: build a [`crate::engine::NormalizedRequest`], call
//! [`crate::engine::Engine::evaluate`], and translate the returned
//! [`crate::engine::Decision`] into the framework's response primitive —
//! a 403-equivalent on block (unless a block hook overrides it), normal
//! continuation on allow.

pub mod axum;
