//! Events emitted when notification state changes

mod notification_event;

pub use notification_event::NotificationEvent;
