//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod activity;
pub mod health;
pub mod live;
pub mod notifications;
pub mod reactions;
pub mod votes;
