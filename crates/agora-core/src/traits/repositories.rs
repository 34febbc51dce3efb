//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer states what it needs and the storage adapters provide it.
//! Every mutation that the domain relies on being atomic is a single method
//! here, so adapters can map it to one storage statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{ChatMessage, Notification, ReactionChange, SuppressionKey, VotableEntity};
use crate::error::DomainError;
use crate::value_objects::{Snowflake, VotableKind, VoteKind};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Votable Repository
// ============================================================================

#[async_trait]
pub trait VotableRepository: Send + Sync {
    async fn find_by_id(&self, kind: VotableKind, id: Snowflake)
        -> RepoResult<Option<VotableEntity>>;

    async fn create(&self, entity: &VotableEntity) -> RepoResult<()>;

    /// Rewrite title/content only; the vote sets are never part of this update.
    /// Returns `false` when the entity does not exist.
    async fn update_content(
        &self,
        kind: VotableKind,
        id: Snowflake,
        title: Option<&str>,
        content: &str,
    ) -> RepoResult<bool>;

    /// Delete an entity. Deleting a post removes its replies.
    async fn delete(&self, kind: VotableKind, id: Snowflake) -> RepoResult<bool>;

    /// Apply one vote transition as a single atomic update and return the
    /// entity as stored afterwards, or `None` if it does not exist.
    async fn apply_vote(
        &self,
        kind: VotableKind,
        id: Snowflake,
        user_id: Snowflake,
        vote: VoteKind,
    ) -> RepoResult<Option<VotableEntity>>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ChatMessage>>;

    async fn create(&self, message: &ChatMessage) -> RepoResult<()>;

    /// Toggle `user_id`'s `emoji` reaction. Each branch is one conditional
    /// update. `None` when the message does not exist.
    async fn toggle_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<Option<(ReactionChange, ChatMessage)>>;

    /// Remove a reaction without ever adding one. The flag tells whether a
    /// reaction was actually removed.
    async fn remove_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<Option<(bool, ChatMessage)>>;
}

// ============================================================================
// Notification Repository
// ============================================================================

/// Feed query for one recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationQuery {
    pub limit: u32,
    pub unread_only: bool,
}

/// Result of marking a single notification as read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadTransition {
    /// Was unread, `read_at` now set
    Marked,
    /// Was already read, left untouched
    AlreadyRead,
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Notification>>;

    /// Unread notification holding the suppression key, if any
    async fn find_unread(&self, key: &SuppressionKey) -> RepoResult<Option<Notification>>;

    async fn create(&self, notification: &Notification) -> RepoResult<()>;

    /// Newest first
    async fn list(
        &self,
        recipient_id: Snowflake,
        query: NotificationQuery,
    ) -> RepoResult<Vec<Notification>>;

    async fn count_unread(&self, recipient_id: Snowflake) -> RepoResult<u64>;

    async fn unread_ids(&self, recipient_id: Snowflake) -> RepoResult<Vec<Snowflake>>;

    /// `None` when the notification does not exist or belongs to someone else
    async fn mark_read(
        &self,
        id: Snowflake,
        recipient_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<ReadTransition>>;

    /// Mark every unread notification of the recipient in one update and
    /// return the ids that changed. Already-read records keep their `read_at`.
    async fn mark_all_read(
        &self,
        recipient_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<Vec<Snowflake>>;

    /// Delete a recipient's notification, returning what was removed
    async fn delete(
        &self,
        id: Snowflake,
        recipient_id: Snowflake,
    ) -> RepoResult<Option<Notification>>;
}
