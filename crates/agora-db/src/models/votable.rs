//! Forum post / reply row

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Shared row shape of `forum_posts` and `forum_replies`.
///
/// Columns a table lacks are selected as typed NULLs.
#[derive(Debug, Clone, FromRow)]
pub struct VotableModel {
    pub id: i64,
    pub author_id: i64,
    pub parent_id: Option<i64>,
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub content: String,
    pub likes: Vec<i64>,
    pub dislikes: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
