//! Domain entities - core business objects

mod message;
mod notification;
mod user;
mod votable;

pub use message::{ChatMessage, EmojiReaction, ReactionChange};
pub use notification::{
    ContentKind, NewNotification, Notification, NotificationPayload, NotificationType,
    RelatedEntity, SuppressionKey,
};
pub use user::{UserProfile, UserRole};
pub use votable::{VotableEntity, Votes};
