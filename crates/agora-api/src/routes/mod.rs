//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{activity, health, live, notifications, reactions, votes};
use crate::state::AppState;

/// Create the main API router with all routes (excluding health for separate middleware handling)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(vote_routes())
        .merge(reaction_routes())
        .merge(notification_routes())
        .merge(activity_routes())
}

/// Like/dislike toggles
fn vote_routes() -> Router<AppState> {
    Router::new()
        .route("/posts/:post_id/votes", post(votes::vote_post))
        .route("/replies/:reply_id/votes", post(votes::vote_reply))
}

/// Message reactions
fn reaction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/messages/:message_id/reactions/:emoji",
            put(reactions::toggle_reaction),
        )
        .route(
            "/messages/:message_id/reactions/:emoji/:user_id",
            delete(reactions::remove_member_reaction),
        )
}

/// The caller's notifications
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/live", get(live::live_feed))
        .route(
            "/notifications/:notification_id",
            delete(notifications::delete_notification),
        )
        .route(
            "/notifications/:notification_id/read",
            post(notifications::mark_read),
        )
}

/// Announcements from the forum and chat write paths
fn activity_routes() -> Router<AppState> {
    Router::new()
        .route("/activity/posts/:post_id", post(activity::post_published))
        .route("/activity/replies/:reply_id", post(activity::reply_published))
        .route("/activity/messages/:message_id", post(activity::message_sent))
}
