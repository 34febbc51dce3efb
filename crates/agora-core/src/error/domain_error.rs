//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{Snowflake, VotableKind};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Authorization Errors
    // =========================================================================
    /// No acting identity in the calling context
    #[error("Not authorized")]
    NotAuthorized,

    #[error("Missing capability: {0}")]
    MissingCapability(&'static str),

    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Post not found: {0}")]
    PostNotFound(Snowflake),

    #[error("Reply not found: {0}")]
    ReplyNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Notification not found: {0}")]
    NotificationNotFound(Snowflake),

    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid emoji: {0:?}")]
    InvalidEmoji(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Not-found error for a post or reply id
    pub fn votable_not_found(kind: VotableKind, id: Snowflake) -> Self {
        match kind {
            VotableKind::Post => Self::PostNotFound(id),
            VotableKind::Reply => Self::ReplyNotFound(id),
        }
    }

    /// Error code exposed to clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAuthorized => "not-authorized",
            Self::MissingCapability(_) => "missing-capability",

            Self::PostNotFound(_) => "post-not-found",
            Self::ReplyNotFound(_) => "reply-not-found",
            Self::MessageNotFound(_) | Self::NotificationNotFound(_) | Self::UserNotFound(_) => {
                "not-found"
            }

            Self::ValidationError(_) => "validation-error",
            Self::InvalidEmoji(_) => "invalid-emoji",

            Self::DatabaseError(_) => "database-error",
            Self::CacheError(_) => "cache-error",
            Self::InternalError(_) => "internal-error",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PostNotFound(_)
                | Self::ReplyNotFound(_)
                | Self::MessageNotFound(_)
                | Self::NotificationNotFound(_)
                | Self::UserNotFound(_)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::InvalidEmoji(_))
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotAuthorized | Self::MissingCapability(_))
    }

    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::CacheError(_) | Self::InternalError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_codes() {
        assert_eq!(DomainError::NotAuthorized.code(), "not-authorized");
        assert_eq!(DomainError::PostNotFound(Snowflake::new(1)).code(), "post-not-found");
        assert_eq!(DomainError::ReplyNotFound(Snowflake::new(1)).code(), "reply-not-found");
        assert_eq!(DomainError::MessageNotFound(Snowflake::new(1)).code(), "not-found");
        assert_eq!(
            DomainError::NotificationNotFound(Snowflake::new(1)).code(),
            "not-found"
        );
    }

    #[test]
    fn votable_not_found_picks_variant() {
        let id = Snowflake::new(7);
        assert!(matches!(
            DomainError::votable_not_found(VotableKind::Reply, id),
            DomainError::ReplyNotFound(x) if x == id
        ));
        assert!(DomainError::votable_not_found(VotableKind::Post, id).is_not_found());
    }

    #[test]
    fn classification() {
        assert!(DomainError::NotAuthorized.is_authorization());
        assert!(DomainError::InvalidEmoji(String::new()).is_validation());
        assert!(DomainError::DatabaseError("down".into()).is_infrastructure());
        assert!(!DomainError::NotAuthorized.is_not_found());
    }

    #[test]
    fn display() {
        let err = DomainError::PostNotFound(Snowflake::new(123));
        assert_eq!(err.to_string(), "Post not found: 123");
    }
}
