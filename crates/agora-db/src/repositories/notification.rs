//! PostgreSQL implementation of NotificationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use agora_core::entities::{Notification, SuppressionKey};
use agora_core::traits::{NotificationQuery, NotificationRepository, ReadTransition, RepoResult};
use agora_core::value_objects::Snowflake;

use crate::mappers::NotificationInsert;
use crate::models::NotificationModel;

use super::error::map_db_error;

/// PostgreSQL implementation of NotificationRepository
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    /// Create a new PgNotificationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_entities(rows: Vec<NotificationModel>) -> RepoResult<Vec<Notification>> {
    rows.into_iter().map(Notification::try_from).collect()
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Notification>> {
        let result = sqlx::query_as::<_, NotificationModel>(
            r#"
            SELECT id, user_id, notification_type, title, message, related_id, related_kind,
                   actor_id, payload, read, created_at, read_at
            FROM notifications
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Notification::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_unread(&self, key: &SuppressionKey) -> RepoResult<Option<Notification>> {
        let result = sqlx::query_as::<_, NotificationModel>(
            r#"
            SELECT id, user_id, notification_type, title, message, related_id, related_kind,
                   actor_id, payload, read, created_at, read_at
            FROM notifications
            WHERE user_id = $1 AND notification_type = $2 AND related_id = $3 AND read = false
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(key.recipient_id.into_inner())
        .bind(key.notification_type.as_str())
        .bind(key.related_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Notification::try_from).transpose()
    }

    #[instrument(skip(self, notification), fields(id = %notification.id))]
    async fn create(&self, notification: &Notification) -> RepoResult<()> {
        let row = NotificationInsert::new(notification)?;

        sqlx::query(
            r#"
            INSERT INTO notifications
                (id, user_id, notification_type, title, message, related_id, related_kind,
                 actor_id, payload, read, created_at, read_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(row.id)
        .bind(row.user_id)
        .bind(row.notification_type)
        .bind(row.title)
        .bind(row.message)
        .bind(row.related_id)
        .bind(row.related_kind)
        .bind(row.actor_id)
        .bind(row.payload)
        .bind(notification.read)
        .bind(notification.created_at)
        .bind(notification.read_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        recipient_id: Snowflake,
        query: NotificationQuery,
    ) -> RepoResult<Vec<Notification>> {
        let limit = i64::from(query.limit.max(1));

        let rows = sqlx::query_as::<_, NotificationModel>(
            r#"
            SELECT id, user_id, notification_type, title, message, related_id, related_kind,
                   actor_id, payload, read, created_at, read_at
            FROM notifications
            WHERE user_id = $1 AND ($2 = false OR read = false)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(recipient_id.into_inner())
        .bind(query.unread_only)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        into_entities(rows)
    }

    #[instrument(skip(self))]
    async fn count_unread(&self, recipient_id: Snowflake) -> RepoResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = false",
        )
        .bind(recipient_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    #[instrument(skip(self))]
    async fn unread_ids(&self, recipient_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT id FROM notifications WHERE user_id = $1 AND read = false",
        )
        .bind(recipient_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(Snowflake::new).collect())
    }

    #[instrument(skip(self))]
    async fn mark_read(
        &self,
        id: Snowflake,
        recipient_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<ReadTransition>> {
        let was_read: Option<bool> = sqlx::query_scalar(
            r#"
            WITH target AS (
                SELECT id, read FROM notifications
                WHERE id = $1 AND user_id = $2
                FOR UPDATE
            )
            UPDATE notifications n
            SET read = true, read_at = COALESCE(n.read_at, $3)
            FROM target
            WHERE n.id = target.id
            RETURNING target.read
            "#,
        )
        .bind(id.into_inner())
        .bind(recipient_id.into_inner())
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(was_read.map(|was_read| {
            if was_read {
                ReadTransition::AlreadyRead
            } else {
                ReadTransition::Marked
            }
        }))
    }

    #[instrument(skip(self))]
    async fn mark_all_read(
        &self,
        recipient_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<Vec<Snowflake>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            UPDATE notifications
            SET read = true, read_at = $2
            WHERE user_id = $1 AND read = false
            RETURNING id
            "#,
        )
        .bind(recipient_id.into_inner())
        .bind(at)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(Snowflake::new).collect())
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        id: Snowflake,
        recipient_id: Snowflake,
    ) -> RepoResult<Option<Notification>> {
        let result = sqlx::query_as::<_, NotificationModel>(
            r#"
            DELETE FROM notifications
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, notification_type, title, message, related_id, related_kind,
                      actor_id, payload, read, created_at, read_at
            "#,
        )
        .bind(id.into_inner())
        .bind(recipient_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Notification::try_from).transpose()
    }
}
