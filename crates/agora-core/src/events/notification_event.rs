//! Notification lifecycle events
//!
//! Emitted after the corresponding storage write succeeded. The live unread
//! counter is driven entirely by these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::NotificationType;
use crate::value_objects::Snowflake;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationEvent {
    /// A new unread notification was stored
    Created {
        recipient_id: Snowflake,
        notification_id: Snowflake,
        notification_type: NotificationType,
        timestamp: DateTime<Utc>,
    },
    /// One notification went from unread to read
    Read {
        recipient_id: Snowflake,
        notification_id: Snowflake,
        timestamp: DateTime<Utc>,
    },
    /// Every listed notification went from unread to read in one update
    AllRead {
        recipient_id: Snowflake,
        notification_ids: Vec<Snowflake>,
        timestamp: DateTime<Utc>,
    },
    Deleted {
        recipient_id: Snowflake,
        notification_id: Snowflake,
        was_unread: bool,
        timestamp: DateTime<Utc>,
    },
}

impl NotificationEvent {
    pub fn created(
        recipient_id: Snowflake,
        notification_id: Snowflake,
        notification_type: NotificationType,
    ) -> Self {
        Self::Created {
            recipient_id,
            notification_id,
            notification_type,
            timestamp: Utc::now(),
        }
    }

    pub fn read(recipient_id: Snowflake, notification_id: Snowflake) -> Self {
        Self::Read {
            recipient_id,
            notification_id,
            timestamp: Utc::now(),
        }
    }

    pub fn all_read(recipient_id: Snowflake, notification_ids: Vec<Snowflake>) -> Self {
        Self::AllRead {
            recipient_id,
            notification_ids,
            timestamp: Utc::now(),
        }
    }

    pub fn deleted(recipient_id: Snowflake, notification_id: Snowflake, was_unread: bool) -> Self {
        Self::Deleted {
            recipient_id,
            notification_id,
            was_unread,
            timestamp: Utc::now(),
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Created { .. } => "CREATED",
            Self::Read { .. } => "READ",
            Self::AllRead { .. } => "ALL_READ",
            Self::Deleted { .. } => "DELETED",
        }
    }

    pub fn recipient_id(&self) -> Snowflake {
        match self {
            Self::Created { recipient_id, .. }
            | Self::Read { recipient_id, .. }
            | Self::AllRead { recipient_id, .. }
            | Self::Deleted { recipient_id, .. } => *recipient_id,
        }
    }
}
