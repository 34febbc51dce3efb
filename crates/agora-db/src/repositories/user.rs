//! PostgreSQL implementation of UserDirectory

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use agora_core::entities::UserProfile;
use agora_core::error::DomainError;
use agora_core::traits::{RepoResult, UserDirectory};
use agora_core::value_objects::Snowflake;

use crate::models::UserModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of UserDirectory
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    /// Create a new PgUserDirectory
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a profile pushed by the identity provider
    #[instrument(skip(self, profile), fields(id = %profile.id))]
    pub async fn upsert(&self, profile: &UserProfile) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, display_name, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET username = EXCLUDED.username,
                display_name = EXCLUDED.display_name,
                role = EXCLUDED.role
            "#,
        )
        .bind(profile.id.into_inner())
        .bind(&profile.username)
        .bind(&profile.display_name)
        .bind(profile.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::ValidationError(format!(
                    "username {} is already taken",
                    profile.username
                ))
            })
        })?;

        Ok(())
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<UserProfile>> {
        let result = sqlx::query_as::<_, UserModel>(
            "SELECT id, username, display_name, role FROM users WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(UserProfile::from))
    }

    #[instrument(skip(self))]
    async fn find_by_usernames(&self, usernames: &[String]) -> RepoResult<Vec<UserProfile>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, UserModel>(
            "SELECT id, username, display_name, role FROM users WHERE username = ANY($1)",
        )
        .bind(usernames)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(UserProfile::from).collect())
    }
}
