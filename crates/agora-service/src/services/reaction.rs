//! Reaction service
//!
//! Like/dislike votes on forum posts and replies, and emoji reactions on chat
//! messages. Each toggle is a single storage update; notifications triggered
//! by a toggle never fail it.

use tracing::{info, instrument, warn};

use agora_core::{DomainError, ReactionChange, Snowflake, VotableKind, VoteKind, VoteState};

use crate::dto::{MessageReactionResponse, VoteResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::notification::NotificationService;

/// Longest accepted emoji, in bytes
pub const MAX_EMOJI_BYTES: usize = 64;

fn validate_emoji(emoji: &str) -> Result<(), DomainError> {
    if emoji.trim().is_empty() || emoji.len() > MAX_EMOJI_BYTES {
        return Err(DomainError::InvalidEmoji(emoji.to_string()));
    }
    Ok(())
}

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Apply a like, dislike or removal to a post or reply
    #[instrument(skip(self))]
    pub async fn toggle_vote(
        &self,
        actor_id: Option<Snowflake>,
        kind: VotableKind,
        entity_id: Snowflake,
        vote: VoteKind,
    ) -> ServiceResult<VoteResponse> {
        let user_id = actor_id.ok_or_else(ServiceError::not_authorized)?;

        let entity = self
            .ctx
            .votable_repo()
            .apply_vote(kind, entity_id, user_id, vote)
            .await?
            .ok_or_else(|| DomainError::votable_not_found(kind, entity_id))?;

        let response = VoteResponse::from_entity(&entity, user_id);

        info!(
            entity_id = %entity_id,
            user_id = %user_id,
            vote = %vote,
            likes = response.likes,
            dislikes = response.dislikes,
            "Vote applied"
        );

        if entity.is_post() && vote == VoteKind::Like && response.state == VoteState::Liked {
            let result = NotificationService::new(self.ctx)
                .notify_post_liked(
                    entity.id,
                    entity.title_or_empty(),
                    user_id,
                    Some(entity.author_id),
                )
                .await;
            if let Err(e) = result {
                warn!(post_id = %entity.id, error = %e, "Post-liked notification failed");
            }
        }

        Ok(response)
    }

    /// Add the caller's emoji reaction, or withdraw it if already present
    #[instrument(skip(self))]
    pub async fn toggle_message_reaction(
        &self,
        actor_id: Option<Snowflake>,
        message_id: Snowflake,
        emoji: &str,
    ) -> ServiceResult<MessageReactionResponse> {
        let user_id = actor_id.ok_or_else(ServiceError::not_authorized)?;
        validate_emoji(emoji)?;

        let (change, message) = self
            .ctx
            .message_repo()
            .toggle_reaction(message_id, user_id, emoji)
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))?;

        info!(
            message_id = %message_id,
            user_id = %user_id,
            emoji = %emoji,
            added = change.is_addition(),
            "Reaction toggled"
        );

        if change == ReactionChange::Added && message.author_id != user_id {
            let result = NotificationService::new(self.ctx)
                .notify_message_reaction(message.id, emoji, user_id, message.author_id)
                .await;
            if let Err(e) = result {
                warn!(message_id = %message.id, error = %e, "Reaction notification failed");
            }
        }

        Ok(MessageReactionResponse::new(change, &message))
    }

    /// Strip `target_id`'s emoji reaction. Anyone may remove their own;
    /// removing someone else's needs the moderator capability.
    #[instrument(skip(self))]
    pub async fn remove_member_reaction(
        &self,
        actor_id: Option<Snowflake>,
        message_id: Snowflake,
        target_id: Snowflake,
        emoji: &str,
    ) -> ServiceResult<MessageReactionResponse> {
        let user_id = actor_id.ok_or_else(ServiceError::not_authorized)?;
        validate_emoji(emoji)?;

        if user_id != target_id {
            self.require_moderator(user_id).await?;
        }

        let (removed, message) = self
            .ctx
            .message_repo()
            .remove_reaction(message_id, target_id, emoji)
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))?;

        if removed {
            info!(
                message_id = %message_id,
                moderator_id = %user_id,
                target_id = %target_id,
                emoji = %emoji,
                "Reaction removed"
            );
        }

        Ok(MessageReactionResponse::new(ReactionChange::Removed, &message))
    }

    async fn require_moderator(&self, user_id: Snowflake) -> ServiceResult<()> {
        let profile = self.ctx.user_directory().find_by_id(user_id).await?;
        match profile {
            Some(p) if self.ctx.role_checker().can_moderate(&p) => Ok(()),
            _ => Err(DomainError::MissingCapability("moderator").into()),
        }
    }
}
