//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize`; bodies also implement `Validate`.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use agora_core::VoteKind;

// ============================================================================
// Reaction Requests
// ============================================================================

/// Vote toggle request body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VoteRequest {
    /// `like`, `dislike` or `remove`
    #[validate(custom(function = "validate_vote_kind"))]
    pub kind: String,
}

impl VoteRequest {
    /// Parsed vote kind. Call after validation.
    pub fn vote_kind(&self) -> Option<VoteKind> {
        self.kind.parse().ok()
    }
}

fn validate_vote_kind(kind: &str) -> Result<(), ValidationError> {
    kind.parse::<VoteKind>().map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("vote_kind");
        err.message = Some("kind must be one of like, dislike, remove".into());
        err
    })
}

// ============================================================================
// Notification Requests
// ============================================================================

/// Feed query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationListQuery {
    /// Clamped to the configured range
    pub limit: Option<u32>,
    #[serde(default)]
    pub unread_only: bool,
}
