//! Notification database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for notifications table
#[derive(Debug, Clone, FromRow)]
pub struct NotificationModel {
    pub id: i64,
    pub user_id: i64,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub related_id: i64,
    pub related_kind: String,
    pub actor_id: i64,
    pub payload: serde_json::Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}
