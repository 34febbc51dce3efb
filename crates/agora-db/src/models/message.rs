//! Chat message database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for chat_messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub channel_id: i64,
    pub author_id: i64,
    pub recipient_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

/// Database model for message_reactions table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub emoji: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}
