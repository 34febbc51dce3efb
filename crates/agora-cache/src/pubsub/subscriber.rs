//! Redis Pub/Sub relay.
//!
//! Pattern-subscribes to every recipient channel and hands each decoded
//! notification event to a local sink (normally the in-process hub feeding
//! the live unread counters). Reconnects after errors until shut down.

use std::sync::Arc;

use futures_util::StreamExt;
use redis::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use agora_core::traits::NotificationEventSink;
use agora_core::NotificationEvent;

use crate::pool::redact;
use crate::pubsub::{PubSubChannel, NOTIFICATION_PATTERN};

/// Error type for subscriber operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Channel closed")]
    ChannelClosed,
}

/// Result type for subscriber operations
pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// Message received from Pub/Sub
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    /// Channel the message was received on
    pub channel: PubSubChannel,
    /// Decoded event, if the payload was a valid event for this channel
    pub event: Option<NotificationEvent>,
}

impl ReceivedMessage {
    /// Create from raw Redis message
    fn from_redis(channel_name: &str, payload: &str) -> Self {
        let channel = PubSubChannel::parse(channel_name);
        let event = serde_json::from_str::<NotificationEvent>(payload)
            .ok()
            .filter(|event| channel.recipient() == Some(event.recipient_id()));

        Self { channel, event }
    }
}

/// Relay configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Reconnection delay in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            reconnect_delay_ms: 1000,
        }
    }
}

/// Commands for the background listener
#[derive(Debug)]
enum RelayCommand {
    Shutdown,
}

/// Handle to a running relay
pub struct EventRelay {
    control_tx: mpsc::Sender<RelayCommand>,
    task: JoinHandle<()>,
}

impl EventRelay {
    /// Start relaying every recipient channel into `sink`
    #[must_use]
    pub fn spawn(config: SubscriberConfig, sink: Arc<dyn NotificationEventSink>) -> Self {
        let (control_tx, control_rx) = mpsc::channel(4);
        let task = tokio::spawn(Self::listener_loop(config, sink, control_rx));
        Self { control_tx, task }
    }

    /// Background listener loop
    async fn listener_loop(
        config: SubscriberConfig,
        sink: Arc<dyn NotificationEventSink>,
        mut control_rx: mpsc::Receiver<RelayCommand>,
    ) {
        loop {
            match Self::run_listener(&config, sink.as_ref(), &mut control_rx).await {
                Ok(true) => {
                    tracing::info!("Relay shutting down");
                    break;
                }
                Ok(false) => {
                    tracing::warn!("Pub/Sub stream ended, reconnecting");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Relay error, reconnecting");
                }
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(config.reconnect_delay_ms))
                .await;
        }
    }

    /// Run the listener until error or shutdown. `Ok(true)` means shutdown.
    async fn run_listener(
        config: &SubscriberConfig,
        sink: &dyn NotificationEventSink,
        control_rx: &mut mpsc::Receiver<RelayCommand>,
    ) -> SubscriberResult<bool> {
        let client = Client::open(config.redis_url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;
        pubsub.psubscribe(NOTIFICATION_PATTERN).await?;

        tracing::info!(
            url = %redact(&config.redis_url),
            pattern = NOTIFICATION_PATTERN,
            "Relay connected to Redis"
        );

        let mut stream = pubsub.on_message();

        loop {
            tokio::select! {
                msg = stream.next() => {
                    let Some(msg) = msg else {
                        return Ok(false);
                    };
                    let payload: String = msg.get_payload().unwrap_or_default();
                    let received = ReceivedMessage::from_redis(msg.get_channel_name(), &payload);

                    match received.event {
                        Some(event) => {
                            if let Err(e) = sink.emit(event).await {
                                tracing::warn!(error = %e, "Failed to deliver relayed event");
                            }
                        }
                        None => {
                            tracing::warn!(channel = %received.channel, "Dropping undecodable Pub/Sub message");
                        }
                    }
                }

                cmd = control_rx.recv() => {
                    match cmd {
                        Some(RelayCommand::Shutdown) | None => return Ok(true),
                    }
                }
            }
        }
    }

    /// Stop the relay and wait for the listener to exit
    pub async fn shutdown(self) -> SubscriberResult<()> {
        self.control_tx
            .send(RelayCommand::Shutdown)
            .await
            .map_err(|_| SubscriberError::ChannelClosed)?;
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Relay task ended abnormally");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::Snowflake;

    #[test]
    fn test_received_message_parsing() {
        let event = NotificationEvent::read(Snowflake::new(42), Snowflake::new(7));
        let payload = serde_json::to_string(&event).unwrap();

        let msg = ReceivedMessage::from_redis("notifications:42", &payload);
        assert_eq!(msg.channel, PubSubChannel::Notifications(Snowflake::new(42)));
        assert_eq!(msg.event, Some(event));
    }

    #[test]
    fn test_event_on_wrong_channel_is_dropped() {
        let event = NotificationEvent::read(Snowflake::new(42), Snowflake::new(7));
        let payload = serde_json::to_string(&event).unwrap();

        assert!(ReceivedMessage::from_redis("notifications:43", &payload).event.is_none());
    }

    #[test]
    fn test_received_message_invalid_json() {
        let msg = ReceivedMessage::from_redis("notifications:123", "invalid");
        assert!(msg.event.is_none());
    }

    #[test]
    fn test_subscriber_config_default() {
        let config = SubscriberConfig::default();
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.reconnect_delay_ms, 1000);
    }
}
