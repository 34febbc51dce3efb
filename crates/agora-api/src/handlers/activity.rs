//! Activity handlers
//!
//! Called by the forum and chat write paths once content is stored.

use axum::extract::{Path, State};
use agora_service::dto::ActivityResponse;
use agora_service::ActivityService;

use crate::extractors::{AuthUser, MessageIdPath, PostIdPath, ReplyIdPath};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// POST /activity/posts/{post_id}
pub async fn post_published(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<PostIdPath>,
) -> ApiResult<Created<ActivityResponse>> {
    let post_id = path.post_id()?;
    let response = ActivityService::new(state.service_context())
        .post_published(auth.actor(), post_id)
        .await?;
    Ok(Created(response))
}

/// POST /activity/replies/{reply_id}
pub async fn reply_published(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ReplyIdPath>,
) -> ApiResult<Created<ActivityResponse>> {
    let reply_id = path.reply_id()?;
    let response = ActivityService::new(state.service_context())
        .reply_published(auth.actor(), reply_id)
        .await?;
    Ok(Created(response))
}

/// POST /activity/messages/{message_id}
pub async fn message_sent(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<MessageIdPath>,
) -> ApiResult<Created<ActivityResponse>> {
    let message_id = path.message_id()?;
    let response = ActivityService::new(state.service_context())
        .message_sent(auth.actor(), message_id)
        .await?;
    Ok(Created(response))
}
