//! Integration test utilities
//!
//! Spawns the API on an in-memory store seeded with a few community members
//! and drives it over HTTP and WebSocket.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
