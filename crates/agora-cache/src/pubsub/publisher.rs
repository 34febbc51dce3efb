//! Redis Pub/Sub publisher.
//!
//! Publishes notification lifecycle events on the recipient's channel so that
//! every server instance can update its live unread counters.

use async_trait::async_trait;
use redis::AsyncCommands;

use agora_core::traits::{NotificationEventSink, RepoResult};
use agora_core::NotificationEvent;

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::PubSubChannel;

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish an event on its recipient's channel. Returns the number of
    /// subscribers that received it.
    pub async fn publish(&self, event: &NotificationEvent) -> RedisResult<u32> {
        let channel = PubSubChannel::notifications(event.recipient_id());
        let payload = serde_json::to_string(event)?;
        let mut conn = self.pool.get().await?;

        let channel_name = channel.name();
        let receivers: u32 = conn.publish(&channel_name, &payload).await?;

        tracing::debug!(
            channel = %channel_name,
            event_type = event.event_type(),
            receivers = receivers,
            "Published event"
        );

        Ok(receivers)
    }
}

#[async_trait]
impl NotificationEventSink for Publisher {
    async fn emit(&self, event: NotificationEvent) -> RepoResult<()> {
        self.publish(&event).await?;
        Ok(())
    }
}
