//! PostgreSQL implementation of VotableRepository
//!
//! Posts and replies live in separate tables but share one row shape; the
//! per-kind column lists below project both onto `VotableModel`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use agora_core::entities::VotableEntity;
use agora_core::traits::{RepoResult, VotableRepository};
use agora_core::value_objects::{Snowflake, VotableKind, VoteKind};

use crate::mappers::VotableInsert;
use crate::models::VotableModel;

use super::error::map_db_error;

const POST_COLUMNS: &str = "id, author_id, NULL::BIGINT AS parent_id, category_id, title, \
     content, likes, dislikes, created_at, updated_at";

const REPLY_COLUMNS: &str = "id, author_id, post_id AS parent_id, NULL::BIGINT AS category_id, \
     NULL::TEXT AS title, content, likes, dislikes, created_at, updated_at";

fn table(kind: VotableKind) -> &'static str {
    match kind {
        VotableKind::Post => "forum_posts",
        VotableKind::Reply => "forum_replies",
    }
}

fn columns(kind: VotableKind) -> &'static str {
    match kind {
        VotableKind::Post => POST_COLUMNS,
        VotableKind::Reply => REPLY_COLUMNS,
    }
}

/// Set expressions for one vote transition. `$2` is the voter.
fn vote_assignments(vote: VoteKind) -> &'static str {
    match vote {
        VoteKind::Like => {
            "likes = CASE WHEN $2 = ANY(likes) THEN array_remove(likes, $2) \
                          ELSE array_append(likes, $2) END, \
             dislikes = array_remove(dislikes, $2)"
        }
        VoteKind::Dislike => {
            "dislikes = CASE WHEN $2 = ANY(dislikes) THEN array_remove(dislikes, $2) \
                             ELSE array_append(dislikes, $2) END, \
             likes = array_remove(likes, $2)"
        }
        VoteKind::Remove => "likes = array_remove(likes, $2), dislikes = array_remove(dislikes, $2)",
    }
}

/// PostgreSQL implementation of VotableRepository
#[derive(Clone)]
pub struct PgVotableRepository {
    pool: PgPool,
}

impl PgVotableRepository {
    /// Create a new PgVotableRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VotableRepository for PgVotableRepository {
    #[instrument(skip(self))]
    async fn find_by_id(
        &self,
        kind: VotableKind,
        id: Snowflake,
    ) -> RepoResult<Option<VotableEntity>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            columns(kind),
            table(kind)
        );
        let result = sqlx::query_as::<_, VotableModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(|m| m.into_entity(kind)))
    }

    #[instrument(skip(self, entity), fields(id = %entity.id, kind = %entity.kind))]
    async fn create(&self, entity: &VotableEntity) -> RepoResult<()> {
        let row = VotableInsert::new(entity);

        let query = match entity.kind {
            VotableKind::Post => sqlx::query(
                r#"
                INSERT INTO forum_posts
                    (id, author_id, category_id, title, content, likes, dislikes, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(row.id)
            .bind(row.author_id)
            .bind(row.category_id)
            .bind(row.title),
            VotableKind::Reply => sqlx::query(
                r#"
                INSERT INTO forum_replies
                    (id, author_id, post_id, content, likes, dislikes, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(row.id)
            .bind(row.author_id)
            .bind(row.parent_id),
        };

        query
            .bind(row.content)
            .bind(row.likes)
            .bind(row.dislikes)
            .bind(entity.created_at)
            .bind(entity.updated_at)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, title, content))]
    async fn update_content(
        &self,
        kind: VotableKind,
        id: Snowflake,
        title: Option<&str>,
        content: &str,
    ) -> RepoResult<bool> {
        let result = match kind {
            VotableKind::Post => sqlx::query(
                r#"
                UPDATE forum_posts
                SET title = COALESCE($2, title), content = $3, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(id.into_inner())
            .bind(title)
            .bind(content),
            VotableKind::Reply => sqlx::query(
                r#"
                UPDATE forum_replies
                SET content = $2, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(id.into_inner())
            .bind(content),
        }
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, kind: VotableKind, id: Snowflake) -> RepoResult<bool> {
        // Replies go with their post through ON DELETE CASCADE
        let sql = format!("DELETE FROM {} WHERE id = $1", table(kind));
        let result = sqlx::query(&sql)
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn apply_vote(
        &self,
        kind: VotableKind,
        id: Snowflake,
        user_id: Snowflake,
        vote: VoteKind,
    ) -> RepoResult<Option<VotableEntity>> {
        // One UPDATE statement: concurrent toggles on the same row serialize
        // on the row lock and each sees the previous result.
        let sql = format!(
            "UPDATE {} SET {} WHERE id = $1 RETURNING {}",
            table(kind),
            vote_assignments(vote),
            columns(kind)
        );
        let result = sqlx::query_as::<_, VotableModel>(&sql)
            .bind(id.into_inner())
            .bind(user_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(|m| m.into_entity(kind)))
    }
}
