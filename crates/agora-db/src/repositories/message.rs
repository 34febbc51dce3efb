//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use agora_core::entities::{ChatMessage, ReactionChange};
use agora_core::error::DomainError;
use agora_core::traits::{MessageRepository, RepoResult};
use agora_core::value_objects::Snowflake;

use crate::mappers::assemble_message;
use crate::models::{MessageModel, ReactionModel};

use super::error::map_db_error;

/// Delete-or-insert rounds before a toggle gives up
const MAX_TOGGLE_ATTEMPTS: usize = 3;

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load(&self, id: Snowflake) -> RepoResult<Option<ChatMessage>> {
        let message = sqlx::query_as::<_, MessageModel>(
            r#"
            SELECT id, channel_id, author_id, recipient_id, content, created_at, edited_at
            FROM chat_messages
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        let Some(message) = message else {
            return Ok(None);
        };

        let reactions = sqlx::query_as::<_, ReactionModel>(
            r#"
            SELECT emoji, user_id, created_at
            FROM message_reactions
            WHERE message_id = $1
            ORDER BY created_at ASC, user_id ASC
            "#,
        )
        .bind(id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Some(assemble_message(message, reactions)))
    }

    async fn delete_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM message_reactions
            WHERE message_id = $1 AND user_id = $2 AND emoji = $3
            "#,
        )
        .bind(message_id.into_inner())
        .bind(user_id.into_inner())
        .bind(emoji)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ChatMessage>> {
        self.load(id).await
    }

    #[instrument(skip(self, message), fields(id = %message.id))]
    async fn create(&self, message: &ChatMessage) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO chat_messages
                (id, channel_id, author_id, recipient_id, content, created_at, edited_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id.into_inner())
        .bind(message.channel_id.into_inner())
        .bind(message.author_id.into_inner())
        .bind(message.recipient_id.map(Snowflake::into_inner))
        .bind(&message.content)
        .bind(message.created_at)
        .bind(message.edited_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        for reaction in &message.reactions {
            for user in &reaction.users {
                sqlx::query(
                    r#"
                    INSERT INTO message_reactions (message_id, emoji, user_id)
                    VALUES ($1, $2, $3)
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(message.id.into_inner())
                .bind(&reaction.emoji)
                .bind(user.into_inner())
                .execute(&self.pool)
                .await
                .map_err(map_db_error)?;
            }
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn toggle_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<Option<(ReactionChange, ChatMessage)>> {
        // An insert that loses to a concurrent toggle of the same reaction
        // is replayed as the toggle that follows it
        let mut change = None;
        for _ in 0..MAX_TOGGLE_ATTEMPTS {
            if self.delete_reaction(message_id, user_id, emoji).await? {
                change = Some(ReactionChange::Removed);
                break;
            }

            let inserted = sqlx::query(
                r#"
                INSERT INTO message_reactions (message_id, emoji, user_id)
                SELECT $1, $3, $2
                WHERE EXISTS (SELECT 1 FROM chat_messages WHERE id = $1)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(message_id.into_inner())
            .bind(user_id.into_inner())
            .bind(emoji)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

            if inserted.rows_affected() > 0 {
                change = Some(ReactionChange::Added);
                break;
            }
            if self.load(message_id).await?.is_none() {
                return Ok(None);
            }
            debug!(message_id = %message_id, user_id = %user_id, "Reaction toggle raced, retrying");
        }

        let Some(change) = change else {
            return Err(DomainError::DatabaseError(format!(
                "reaction toggle on message {message_id} kept conflicting"
            )));
        };

        Ok(self.load(message_id).await?.map(|m| (change, m)))
    }

    #[instrument(skip(self))]
    async fn remove_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<Option<(bool, ChatMessage)>> {
        let removed = self.delete_reaction(message_id, user_id, emoji).await?;
        Ok(self.load(message_id).await?.map(|m| (removed, m)))
    }
}
