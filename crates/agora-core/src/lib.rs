//! # agora-core
//!
//! Domain layer for the community platform's reaction and notification core:
//! entities, value objects, repository and collaborator traits, lifecycle
//! events and text helpers. No infrastructure dependencies.

pub mod entities;
pub mod error;
pub mod events;
pub mod text;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    ChatMessage, ContentKind, EmojiReaction, NewNotification, Notification, NotificationPayload,
    NotificationType, ReactionChange, RelatedEntity, SuppressionKey, UserProfile, UserRole,
    VotableEntity, Votes,
};
pub use error::DomainError;
pub use events::NotificationEvent;
pub use text::{extract_mentions, preview};
pub use traits::{
    MessageRepository, NotificationEventSink, NotificationQuery, NotificationRepository,
    PresenceDirectory, ProfileRoleChecker, ReadTransition, RepoResult, RoleChecker, UserDirectory,
    VotableRepository,
};
pub use value_objects::{
    Snowflake, SnowflakeGenerator, SnowflakeParseError, VotableKind, VoteKind, VoteState,
};
