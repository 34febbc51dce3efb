//! Pub/Sub channel definitions.
//!
//! Every recipient has one channel carrying their notification lifecycle
//! events: `notifications:{user_id}`. Relays listen on the pattern.

use agora_core::Snowflake;

/// Channel prefix for per-recipient notification events
pub const NOTIFICATION_CHANNEL_PREFIX: &str = "notifications:";
/// Pattern matching every recipient channel
pub const NOTIFICATION_PATTERN: &str = "notifications:*";

/// Pub/Sub channel types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Notification events of one recipient
    Notifications(Snowflake),
    /// Any other channel name
    Custom(String),
}

impl PubSubChannel {
    #[must_use]
    pub fn notifications(user_id: Snowflake) -> Self {
        Self::Notifications(user_id)
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Notifications(id) => format!("{NOTIFICATION_CHANNEL_PREFIX}{id}"),
            Self::Custom(name) => name.clone(),
        }
    }

    /// Parse a channel name back to a `PubSubChannel`
    #[must_use]
    pub fn parse(name: &str) -> Self {
        name.strip_prefix(NOTIFICATION_CHANNEL_PREFIX)
            .and_then(|id| id.parse::<i64>().ok())
            .map_or_else(
                || Self::Custom(name.to_string()),
                |id| Self::Notifications(Snowflake::new(id)),
            )
    }

    /// Recipient addressed by this channel, if any
    #[must_use]
    pub fn recipient(&self) -> Option<Snowflake> {
        match self {
            Self::Notifications(id) => Some(*id),
            Self::Custom(_) => None,
        }
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        let user_id = Snowflake::from(11111i64);
        assert_eq!(PubSubChannel::notifications(user_id).name(), "notifications:11111");
        assert_eq!(PubSubChannel::Custom("test".into()).name(), "test");
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!(
            PubSubChannel::parse("notifications:11111"),
            PubSubChannel::Notifications(Snowflake::from(11111i64))
        );
        assert_eq!(
            PubSubChannel::parse("notifications:abc"),
            PubSubChannel::Custom("notifications:abc".to_string())
        );
        assert_eq!(PubSubChannel::parse("other").recipient(), None);
    }
}
