//! Presence module.
//!
//! Tracks which users are currently online.

mod online_set;

pub use online_set::{RedisPresence, PRESENCE_TTL};
