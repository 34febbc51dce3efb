//! Notification records

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use agora_core::entities::{Notification, SuppressionKey};
use agora_core::traits::{NotificationQuery, NotificationRepository, ReadTransition, RepoResult};
use agora_core::value_objects::Snowflake;

use super::MemoryStore;

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Notification>> {
        Ok(self.notifications.get(&id).map(|n| n.value().clone()))
    }

    async fn find_unread(&self, key: &SuppressionKey) -> RepoResult<Option<Notification>> {
        Ok(self
            .notifications
            .iter()
            .filter(|n| !n.read && n.suppression_key() == *key)
            .min_by_key(|n| (n.created_at, n.id))
            .map(|n| n.value().clone()))
    }

    async fn create(&self, notification: &Notification) -> RepoResult<()> {
        self.notifications
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn list(
        &self,
        recipient_id: Snowflake,
        query: NotificationQuery,
    ) -> RepoResult<Vec<Notification>> {
        let mut feed: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && (!query.unread_only || !n.read))
            .map(|n| n.value().clone())
            .collect();

        feed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        feed.truncate(query.limit.max(1) as usize);
        Ok(feed)
    }

    async fn count_unread(&self, recipient_id: Snowflake) -> RepoResult<u64> {
        Ok(self
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
            .count() as u64)
    }

    async fn unread_ids(&self, recipient_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        Ok(self
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
            .map(|n| n.id)
            .collect())
    }

    async fn mark_read(
        &self,
        id: Snowflake,
        recipient_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<ReadTransition>> {
        let Some(mut entry) = self.notifications.get_mut(&id) else {
            return Ok(None);
        };
        if entry.recipient_id != recipient_id {
            return Ok(None);
        }

        Ok(Some(if entry.mark_read(at) {
            ReadTransition::Marked
        } else {
            ReadTransition::AlreadyRead
        }))
    }

    async fn mark_all_read(
        &self,
        recipient_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<Vec<Snowflake>> {
        let mut changed = Vec::new();
        for mut entry in self.notifications.iter_mut() {
            if entry.recipient_id == recipient_id && entry.mark_read(at) {
                changed.push(entry.id);
            }
        }
        Ok(changed)
    }

    async fn delete(
        &self,
        id: Snowflake,
        recipient_id: Snowflake,
    ) -> RepoResult<Option<Notification>> {
        Ok(self
            .notifications
            .remove_if(&id, |_, n| n.recipient_id == recipient_id)
            .map(|(_, n)| n))
    }
}
