//! Notification handlers
//!
//! The caller's feed, unread counter and read-state changes.

use axum::{
    extract::{Path, State},
    Json,
};
use agora_service::dto::{
    NotificationListResponse, NotificationResponse, SuccessResponse, UnreadCountResponse,
};
use agora_service::NotificationService;

use crate::extractors::{AuthUser, FeedQuery, NotificationIdPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// List the caller's notifications, newest first
///
/// GET /notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    query: FeedQuery,
) -> ApiResult<Json<NotificationListResponse>> {
    let notifications = NotificationService::new(state.service_context())
        .list(auth.actor(), query.limit, query.unread_only)
        .await?;

    Ok(Json(NotificationListResponse {
        notifications: notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    }))
}

/// GET /notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UnreadCountResponse>> {
    let unread_count = NotificationService::new(state.service_context())
        .unread_count(auth.actor())
        .await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

/// POST /notifications/{notification_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<NotificationIdPath>,
) -> ApiResult<Json<SuccessResponse>> {
    let notification_id = path.notification_id()?;
    NotificationService::new(state.service_context())
        .mark_as_read(auth.actor(), notification_id)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<SuccessResponse>> {
    NotificationService::new(state.service_context())
        .mark_all_as_read(auth.actor())
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /notifications/{notification_id}
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<NotificationIdPath>,
) -> ApiResult<Json<SuccessResponse>> {
    let notification_id = path.notification_id()?;
    NotificationService::new(state.service_context())
        .delete_notification(auth.actor(), notification_id)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}
