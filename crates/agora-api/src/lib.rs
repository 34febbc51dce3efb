//! # agora-api
//!
//! HTTP and WebSocket surface built with Axum: votes, message reactions,
//! the notification feed, activity hooks and the live unread-count stream.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, in_memory_state, run, run_server, AppRuntime};
pub use state::AppState;
