//! Path parameter extractors
//!
//! Snowflake ids arrive as strings and are parsed per field so a bad id names
//! the offending parameter.

use agora_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

fn parse_id(raw: &str, field: &str) -> Result<Snowflake, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid {field} format")))
}

/// Path parameters with post_id
#[derive(Debug, Deserialize)]
pub struct PostIdPath {
    pub post_id: String,
}

impl PostIdPath {
    pub fn post_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.post_id, "post_id")
    }
}

/// Path parameters with reply_id
#[derive(Debug, Deserialize)]
pub struct ReplyIdPath {
    pub reply_id: String,
}

impl ReplyIdPath {
    pub fn reply_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.reply_id, "reply_id")
    }
}

/// Path parameters with message_id
#[derive(Debug, Deserialize)]
pub struct MessageIdPath {
    pub message_id: String,
}

impl MessageIdPath {
    pub fn message_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.message_id, "message_id")
    }
}

/// Path parameters with notification_id
#[derive(Debug, Deserialize)]
pub struct NotificationIdPath {
    pub notification_id: String,
}

impl NotificationIdPath {
    pub fn notification_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.notification_id, "notification_id")
    }
}

/// Path parameters for the caller's own reaction
#[derive(Debug, Deserialize)]
pub struct ReactionPath {
    pub message_id: String,
    pub emoji: String,
}

impl ReactionPath {
    pub fn message_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.message_id, "message_id")
    }
}

/// Path parameters for another member's reaction
#[derive(Debug, Deserialize)]
pub struct MemberReactionPath {
    pub message_id: String,
    pub emoji: String,
    pub user_id: String,
}

impl MemberReactionPath {
    pub fn message_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.message_id, "message_id")
    }

    pub fn user_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.user_id, "user_id")
    }
}
