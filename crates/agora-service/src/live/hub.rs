//! In-process fan-out of notification lifecycle events

use async_trait::async_trait;
use tokio::sync::broadcast;

use agora_core::traits::{NotificationEventSink, RepoResult};
use agora_core::NotificationEvent;

/// Default number of buffered events per subscriber
pub const DEFAULT_HUB_CAPACITY: usize = 1024;

/// Broadcasts every event to all live subscribers of this process.
///
/// Subscribers that fall more than `capacity` events behind observe a lag
/// and must resynchronise from storage.
#[derive(Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<NotificationEvent>,
}

impl NotificationHub {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.tx.subscribe()
    }

    /// Forward an event, returning how many subscribers saw it
    pub fn publish(&self, event: NotificationEvent) -> usize {
        // No subscribers is not an error
        self.tx.send(event).unwrap_or(0)
    }

    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_CAPACITY)
    }
}

impl std::fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationHub")
            .field("receivers", &self.tx.receiver_count())
            .finish()
    }
}

#[async_trait]
impl NotificationEventSink for NotificationHub {
    async fn emit(&self, event: NotificationEvent) -> RepoResult<()> {
        let receivers = self.publish(event);
        tracing::trace!(receivers, "Notification event dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::Snowflake;

    #[tokio::test]
    async fn emits_to_every_subscriber() {
        let hub = NotificationHub::new(8);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        let event = NotificationEvent::read(Snowflake::new(1), Snowflake::new(2));
        hub.emit(event.clone()).await.unwrap();

        assert_eq!(a.recv().await.unwrap(), event);
        assert_eq!(b.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn emitting_without_subscribers_succeeds() {
        let hub = NotificationHub::default();
        assert_eq!(hub.receiver_count(), 0);
        hub.emit(NotificationEvent::read(Snowflake::new(1), Snowflake::new(2)))
            .await
            .unwrap();
    }
}
