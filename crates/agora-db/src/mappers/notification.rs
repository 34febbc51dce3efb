//! Notification <-> model mapper

use agora_core::entities::{
    ContentKind, Notification, NotificationPayload, NotificationType, RelatedEntity,
};
use agora_core::error::DomainError;
use agora_core::value_objects::Snowflake;

use crate::models::NotificationModel;

impl TryFrom<NotificationModel> for Notification {
    type Error = DomainError;

    fn try_from(model: NotificationModel) -> Result<Self, Self::Error> {
        let payload: NotificationPayload = serde_json::from_value(model.payload)
            .map_err(|e| corrupt(model.id, &format!("payload: {e}")))?;
        let stored_type: NotificationType = model
            .notification_type
            .parse()
            .map_err(|e: String| corrupt(model.id, &e))?;
        if stored_type != payload.notification_type() {
            return Err(corrupt(model.id, "type column disagrees with payload"));
        }
        let kind: ContentKind = model
            .related_kind
            .parse()
            .map_err(|e: String| corrupt(model.id, &e))?;

        Ok(Notification {
            id: Snowflake::new(model.id),
            recipient_id: Snowflake::new(model.user_id),
            title: model.title,
            message: model.message,
            related: RelatedEntity::new(Snowflake::new(model.related_id), kind),
            actor_id: Snowflake::new(model.actor_id),
            payload,
            read: model.read,
            created_at: model.created_at,
            read_at: model.read_at,
        })
    }
}

fn corrupt(id: i64, detail: &str) -> DomainError {
    DomainError::DatabaseError(format!("notification {id} is malformed: {detail}"))
}

/// Bind-ready values of a notification
pub struct NotificationInsert<'a> {
    pub id: i64,
    pub user_id: i64,
    pub notification_type: &'static str,
    pub title: &'a str,
    pub message: &'a str,
    pub related_id: i64,
    pub related_kind: &'static str,
    pub actor_id: i64,
    pub payload: serde_json::Value,
}

impl<'a> NotificationInsert<'a> {
    pub fn new(notification: &'a Notification) -> Result<Self, DomainError> {
        let payload = serde_json::to_value(&notification.payload)
            .map_err(|e| DomainError::InternalError(e.to_string()))?;
        Ok(Self {
            id: notification.id.into_inner(),
            user_id: notification.recipient_id.into_inner(),
            notification_type: notification.notification_type().as_str(),
            title: &notification.title,
            message: &notification.message,
            related_id: notification.related.id.into_inner(),
            related_kind: notification.related.kind.as_str(),
            actor_id: notification.actor_id.into_inner(),
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn model(notification_type: &str) -> NotificationModel {
        NotificationModel {
            id: 10,
            user_id: 2,
            notification_type: notification_type.to_string(),
            title: "New Reaction".to_string(),
            message: "ana reacted 👍 to your message".to_string(),
            related_id: 77,
            related_kind: "message".to_string(),
            actor_id: 1,
            payload: serde_json::json!({ "type": "message-reaction", "emoji": "👍" }),
            read: false,
            created_at: Utc::now(),
            read_at: None,
        }
    }

    #[test]
    fn row_becomes_notification() {
        let n = Notification::try_from(model("message-reaction")).unwrap();
        assert_eq!(n.notification_type(), NotificationType::MessageReaction);
        assert_eq!(n.related, RelatedEntity::new(Snowflake::new(77), ContentKind::Message));
    }

    #[test]
    fn mismatched_type_is_rejected() {
        assert!(Notification::try_from(model("mention")).is_err());
    }
}
