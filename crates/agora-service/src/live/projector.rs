//! Live unread-count projector
//!
//! A subscription attaches to the hub first and snapshots the recipient's
//! unread ids second. The count is the size of the tracked id set, so any
//! event racing the snapshot is applied idempotently.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, instrument, warn};

use agora_core::traits::NotificationRepository;
use agora_core::{NotificationEvent, Snowflake};

use super::hub::NotificationHub;
use crate::services::ServiceResult;

/// Opens unread-count subscriptions
#[derive(Clone)]
pub struct UnreadCountProjector {
    hub: NotificationHub,
    notifications: Arc<dyn NotificationRepository>,
}

impl UnreadCountProjector {
    pub fn new(hub: NotificationHub, notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { hub, notifications }
    }

    /// Start observing `user_id`'s unread count
    #[instrument(skip(self))]
    pub async fn subscribe(&self, user_id: Snowflake) -> ServiceResult<UnreadSubscription> {
        let events = self.hub.subscribe();
        let unread: HashSet<Snowflake> = self
            .notifications
            .unread_ids(user_id)
            .await?
            .into_iter()
            .collect();
        let reported = unread.len() as u64;

        debug!(user_id = %user_id, unread = reported, "Unread subscription opened");

        Ok(UnreadSubscription {
            user_id,
            events,
            unread,
            reported,
            notifications: self.notifications.clone(),
        })
    }
}

/// One recipient's live unread counter. Dropping it detaches from the hub.
pub struct UnreadSubscription {
    user_id: Snowflake,
    events: broadcast::Receiver<NotificationEvent>,
    unread: HashSet<Snowflake>,
    reported: u64,
    notifications: Arc<dyn NotificationRepository>,
}

impl UnreadSubscription {
    pub fn user_id(&self) -> Snowflake {
        self.user_id
    }

    /// Current unread count
    pub fn count(&self) -> u64 {
        self.unread.len() as u64
    }

    /// Wait until the count differs from the last reported value.
    ///
    /// Returns `Ok(None)` once the event stream has closed.
    pub async fn changed(&mut self) -> ServiceResult<Option<u64>> {
        loop {
            match self.events.recv().await {
                Ok(event) => {
                    if event.recipient_id() != self.user_id {
                        continue;
                    }
                    self.apply(&event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(user_id = %self.user_id, skipped, "Unread subscription lagged, resyncing");
                    self.resync().await?;
                }
                Err(RecvError::Closed) => return Ok(None),
            }

            let count = self.count();
            if count != self.reported {
                self.reported = count;
                return Ok(Some(count));
            }
        }
    }

    fn apply(&mut self, event: &NotificationEvent) {
        match event {
            NotificationEvent::Created {
                notification_id, ..
            } => {
                self.unread.insert(*notification_id);
            }
            NotificationEvent::Read {
                notification_id, ..
            }
            | NotificationEvent::Deleted {
                notification_id, ..
            } => {
                self.unread.remove(notification_id);
            }
            NotificationEvent::AllRead {
                notification_ids, ..
            } => {
                for id in notification_ids {
                    self.unread.remove(id);
                }
            }
        }
    }

    async fn resync(&mut self) -> ServiceResult<()> {
        self.unread = self
            .notifications
            .unread_ids(self.user_id)
            .await?
            .into_iter()
            .collect();
        Ok(())
    }
}

impl std::fmt::Debug for UnreadSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnreadSubscription")
            .field("user_id", &self.user_id)
            .field("unread", &self.unread.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::{
        ContentKind, NewNotification, Notification, NotificationPayload, NotificationType,
        RelatedEntity,
    };
    use agora_db::MemoryStore;

    const USER: Snowflake = Snowflake::new(1);
    const OTHER: Snowflake = Snowflake::new(2);

    fn liked(id: i64, recipient: Snowflake) -> Notification {
        Notification::from_request(
            Snowflake::new(id),
            OTHER,
            NewNotification {
                recipient_id: recipient,
                title: "Your post was liked".to_string(),
                message: "someone liked it".to_string(),
                related: RelatedEntity::new(Snowflake::new(100 + id), ContentKind::Post),
                payload: NotificationPayload::PostLiked {
                    post_title: "t".to_string(),
                },
            },
        )
    }

    #[tokio::test]
    async fn counts_incrementally_for_one_recipient() {
        let store = MemoryStore::new_shared();
        NotificationRepository::create(store.as_ref(), &liked(10, USER)).await.unwrap();

        let hub = NotificationHub::new(16);
        let projector = UnreadCountProjector::new(hub.clone(), store);
        let mut sub = projector.subscribe(USER).await.unwrap();
        assert_eq!(sub.count(), 1);

        hub.publish(NotificationEvent::created(OTHER, Snowflake::new(20), NotificationType::PostLiked));
        hub.publish(NotificationEvent::created(USER, Snowflake::new(11), NotificationType::PostLiked));
        assert_eq!(sub.changed().await.unwrap(), Some(2));

        hub.publish(NotificationEvent::all_read(
            USER,
            vec![Snowflake::new(10), Snowflake::new(11)],
        ));
        assert_eq!(sub.changed().await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn repeated_events_do_not_double_count() {
        let store = MemoryStore::new_shared();
        let hub = NotificationHub::new(16);
        let projector = UnreadCountProjector::new(hub.clone(), store);
        let mut sub = projector.subscribe(USER).await.unwrap();

        let event = NotificationEvent::created(USER, Snowflake::new(5), NotificationType::PostLiked);
        hub.publish(event.clone());
        hub.publish(event);
        hub.publish(NotificationEvent::deleted(USER, Snowflake::new(5), true));

        assert_eq!(sub.changed().await.unwrap(), Some(1));
        assert_eq!(sub.changed().await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn lagging_resyncs_from_storage() {
        let store = MemoryStore::new_shared();
        let hub = NotificationHub::new(1);
        let projector = UnreadCountProjector::new(hub.clone(), store.clone());
        let mut sub = projector.subscribe(USER).await.unwrap();
        assert_eq!(sub.count(), 0);

        // Stored without an event reaching the subscription
        NotificationRepository::create(store.as_ref(), &liked(10, USER)).await.unwrap();
        for id in 30..33 {
            hub.publish(NotificationEvent::created(OTHER, Snowflake::new(id), NotificationType::PostLiked));
        }

        assert_eq!(sub.changed().await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn closed_hub_ends_the_stream() {
        let store = MemoryStore::new_shared();
        let projector = UnreadCountProjector::new(NotificationHub::new(4), store);
        let mut sub = projector.subscribe(USER).await.unwrap();

        drop(projector);
        assert_eq!(sub.changed().await.unwrap(), None);
    }
}
