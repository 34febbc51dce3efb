//! Live notification state: the event hub and unread-count subscriptions

mod hub;
mod projector;

pub use hub::{NotificationHub, DEFAULT_HUB_CAPACITY};
pub use projector::{UnreadCountProjector, UnreadSubscription};
