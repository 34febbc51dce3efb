//! # agora-cache
//!
//! Redis layer for presence and cross-instance notification events.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Presence**: Online users kept in a heartbeat-scored sorted set
//! - **Pub/Sub**: Notification events published per recipient and relayed
//!   back into each instance
//!
//! ## Example
//!
//! ```ignore
//! use agora_cache::{EventRelay, Publisher, RedisPool, RedisPoolConfig, RedisPresence, SubscriberConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let presence = RedisPresence::new(pool.clone());
//! let publisher = Publisher::new(pool.clone());
//!
//! // Feed every published event into the local hub
//! let relay = EventRelay::spawn(
//!     SubscriberConfig { redis_url: pool.url().to_string(), ..Default::default() },
//!     hub.clone(),
//! );
//! ```

pub mod pool;
pub mod presence;
pub mod pubsub;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export presence types
pub use presence::{RedisPresence, PRESENCE_TTL};

// Re-export pubsub types
pub use pubsub::{
    EventRelay, PubSubChannel, Publisher, ReceivedMessage, SubscriberConfig, SubscriberError,
    SubscriberResult, NOTIFICATION_CHANNEL_PREFIX, NOTIFICATION_PATTERN,
};
