//! Notification records and their typed payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value_objects::Snowflake;

/// Semantic event a notification reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    NewPost,
    NewMessage,
    NewReply,
    PostLiked,
    Mention,
    MessageReaction,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewPost => "new-post",
            Self::NewMessage => "new-message",
            Self::NewReply => "new-reply",
            Self::PostLiked => "post-liked",
            Self::Mention => "mention",
            Self::MessageReaction => "message-reaction",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new-post" => Ok(Self::NewPost),
            "new-message" => Ok(Self::NewMessage),
            "new-reply" => Ok(Self::NewReply),
            "post-liked" => Ok(Self::PostLiked),
            "mention" => Ok(Self::Mention),
            "message-reaction" => Ok(Self::MessageReaction),
            other => Err(format!("unknown notification type: {other}")),
        }
    }
}

/// Kind of content a notification points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Reply,
    Message,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Reply => "reply",
            Self::Message => "message",
        }
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(Self::Post),
            "reply" => Ok(Self::Reply),
            "message" => Ok(Self::Message),
            other => Err(format!("unknown content kind: {other}")),
        }
    }
}

/// Entity a notification refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelatedEntity {
    pub id: Snowflake,
    pub kind: ContentKind,
}

impl RelatedEntity {
    pub fn new(id: Snowflake, kind: ContentKind) -> Self {
        Self { id, kind }
    }
}

/// Type-specific data. The variant decides the notification type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NotificationPayload {
    NewPost {
        post_title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category_id: Option<Snowflake>,
    },
    NewMessage {
        preview: String,
    },
    NewReply {
        post_id: Snowflake,
        preview: String,
    },
    PostLiked {
        post_title: String,
    },
    Mention {
        content_type: ContentKind,
        truncated_content: String,
    },
    MessageReaction {
        emoji: String,
    },
}

impl NotificationPayload {
    pub fn notification_type(&self) -> NotificationType {
        match self {
            Self::NewPost { .. } => NotificationType::NewPost,
            Self::NewMessage { .. } => NotificationType::NewMessage,
            Self::NewReply { .. } => NotificationType::NewReply,
            Self::PostLiked { .. } => NotificationType::PostLiked,
            Self::Mention { .. } => NotificationType::Mention,
            Self::MessageReaction { .. } => NotificationType::MessageReaction,
        }
    }
}

/// Unread notifications are unique per key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SuppressionKey {
    pub recipient_id: Snowflake,
    pub notification_type: NotificationType,
    pub related_id: Snowflake,
}

/// Notification request handed to the fan-out entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: Snowflake,
    pub title: String,
    pub message: String,
    pub related: RelatedEntity,
    pub payload: NotificationPayload,
}

impl NewNotification {
    pub fn notification_type(&self) -> NotificationType {
        self.payload.notification_type()
    }

    pub fn suppression_key(&self) -> SuppressionKey {
        SuppressionKey {
            recipient_id: self.recipient_id,
            notification_type: self.notification_type(),
            related_id: self.related.id,
        }
    }
}

/// Stored notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Snowflake,
    pub recipient_id: Snowflake,
    pub title: String,
    pub message: String,
    pub related: RelatedEntity,
    pub actor_id: Snowflake,
    pub payload: NotificationPayload,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Materialize a request as an unread record
    pub fn from_request(id: Snowflake, actor_id: Snowflake, request: NewNotification) -> Self {
        Self {
            id,
            recipient_id: request.recipient_id,
            title: request.title,
            message: request.message,
            related: request.related,
            actor_id,
            payload: request.payload,
            read: false,
            created_at: Utc::now(),
            read_at: None,
        }
    }

    pub fn notification_type(&self) -> NotificationType {
        self.payload.notification_type()
    }

    pub fn suppression_key(&self) -> SuppressionKey {
        SuppressionKey {
            recipient_id: self.recipient_id,
            notification_type: self.notification_type(),
            related_id: self.related.id,
        }
    }

    /// Flip to read. `read_at` is only set on the first transition.
    pub fn mark_read(&mut self, at: DateTime<Utc>) -> bool {
        if self.read {
            return false;
        }
        self.read = true;
        self.read_at = Some(at);
        true
    }
}
