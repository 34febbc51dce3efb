//! Vote handlers
//!
//! Like/dislike toggles on forum posts and replies.

use axum::{
    extract::{Path, State},
    Json,
};
use agora_core::{Snowflake, VotableKind};
use agora_service::dto::{VoteRequest, VoteResponse};
use agora_service::ReactionService;

use crate::extractors::{AuthUser, PostIdPath, ReplyIdPath, ValidatedJson};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

async fn toggle(
    state: &AppState,
    auth: AuthUser,
    kind: VotableKind,
    entity_id: Snowflake,
    request: &VoteRequest,
) -> ApiResult<Json<VoteResponse>> {
    let vote = request
        .vote_kind()
        .ok_or_else(|| ApiError::invalid_body("kind must be one of like, dislike, remove"))?;

    let response = ReactionService::new(state.service_context())
        .toggle_vote(auth.actor(), kind, entity_id, vote)
        .await?;
    Ok(Json(response))
}

/// Toggle a vote on a post
///
/// POST /posts/{post_id}/votes
pub async fn vote_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<PostIdPath>,
    ValidatedJson(request): ValidatedJson<VoteRequest>,
) -> ApiResult<Json<VoteResponse>> {
    toggle(&state, auth, VotableKind::Post, path.post_id()?, &request).await
}

/// Toggle a vote on a reply
///
/// POST /replies/{reply_id}/votes
pub async fn vote_reply(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ReplyIdPath>,
    ValidatedJson(request): ValidatedJson<VoteRequest>,
) -> ApiResult<Json<VoteResponse>> {
    toggle(&state, auth, VotableKind::Reply, path.reply_id()?, &request).await
}
