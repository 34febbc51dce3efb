//! Reaction handlers
//!
//! Endpoints for message reactions.

use axum::{
    extract::{Path, State},
    Json,
};
use agora_service::dto::MessageReactionResponse;
use agora_service::ReactionService;

use crate::extractors::{AuthUser, MemberReactionPath, ReactionPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Toggle the caller's reaction
///
/// PUT /messages/{message_id}/reactions/{emoji}
pub async fn toggle_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ReactionPath>,
) -> ApiResult<Json<MessageReactionResponse>> {
    let message_id = path.message_id()?;

    let response = ReactionService::new(state.service_context())
        .toggle_message_reaction(auth.actor(), message_id, &path.emoji)
        .await?;
    Ok(Json(response))
}

/// Remove a member's reaction
///
/// DELETE /messages/{message_id}/reactions/{emoji}/{user_id}
pub async fn remove_member_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<MemberReactionPath>,
) -> ApiResult<Json<MessageReactionResponse>> {
    let message_id = path.message_id()?;
    let target_id = path.user_id()?;

    let response = ReactionService::new(state.service_context())
        .remove_member_reaction(auth.actor(), message_id, target_id, &path.emoji)
        .await?;
    Ok(Json(response))
}
