//! Redis Pub/Sub module.
//!
//! Carries notification lifecycle events between server instances.

mod channels;
mod publisher;
mod subscriber;

pub use channels::{PubSubChannel, NOTIFICATION_CHANNEL_PREFIX, NOTIFICATION_PATTERN};
pub use publisher::Publisher;
pub use subscriber::{
    EventRelay, ReceivedMessage, SubscriberConfig, SubscriberError, SubscriberResult,
};
