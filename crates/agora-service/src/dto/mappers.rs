//! Entity to DTO conversions

use agora_core::{ChatMessage, EmojiReaction, Notification, ReactionChange, Snowflake, VotableEntity};

use super::responses::{
    MessageReactionResponse, NotificationResponse, ReactionEntryResponse, VoteResponse,
};

impl VoteResponse {
    /// Aggregate of `entity` as seen by `user_id`
    pub fn from_entity(entity: &VotableEntity, user_id: Snowflake) -> Self {
        Self {
            entity_id: entity.id,
            kind: entity.kind,
            likes: entity.votes.like_count(),
            dislikes: entity.votes.dislike_count(),
            state: entity.votes.state_of(user_id),
        }
    }
}

impl From<&EmojiReaction> for ReactionEntryResponse {
    fn from(reaction: &EmojiReaction) -> Self {
        Self {
            emoji: reaction.emoji.clone(),
            count: reaction.users.len(),
            users: reaction.users.clone(),
        }
    }
}

impl MessageReactionResponse {
    pub fn new(change: ReactionChange, message: &ChatMessage) -> Self {
        Self {
            message_id: message.id,
            change,
            reactions: message.reactions.iter().map(ReactionEntryResponse::from).collect(),
        }
    }
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            notification_type: n.notification_type(),
            title: n.title,
            message: n.message,
            related_id: n.related.id,
            related_kind: n.related.kind,
            actor_id: n.actor_id,
            payload: n.payload,
            read: n.read,
            created_at: n.created_at,
            read_at: n.read_at,
        }
    }
}
