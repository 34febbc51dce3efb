//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

use agora_core::{
    ContentKind, NotificationPayload, NotificationType, ReactionChange, Snowflake, VotableKind,
    VoteState,
};

// ============================================================================
// Reaction Responses
// ============================================================================

/// Aggregate after a vote toggle
#[derive(Debug, Clone, Serialize)]
pub struct VoteResponse {
    pub entity_id: Snowflake,
    pub kind: VotableKind,
    pub likes: usize,
    pub dislikes: usize,
    /// Caller's resulting vote
    pub state: VoteState,
}

/// One emoji and the users who reacted with it
#[derive(Debug, Clone, Serialize)]
pub struct ReactionEntryResponse {
    pub emoji: String,
    pub count: usize,
    pub users: Vec<Snowflake>,
}

/// Outcome of a message reaction toggle
#[derive(Debug, Clone, Serialize)]
pub struct MessageReactionResponse {
    pub message_id: Snowflake,
    pub change: ReactionChange,
    pub reactions: Vec<ReactionEntryResponse>,
}

// ============================================================================
// Notification Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct NotificationResponse {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub related_id: Snowflake,
    pub related_kind: ContentKind,
    pub actor_id: Snowflake,
    pub payload: NotificationPayload,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationResponse>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

/// Acknowledgement of a read-side mutation
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Summary of a fan-out triggered by an activity announcement
#[derive(Debug, Clone, Serialize)]
pub struct ActivityResponse {
    pub created: usize,
    pub existing: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Fan-out stages that failed as a whole
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_stages: Vec<&'static str>,
    /// Ids of the notifications written by this call
    pub notification_ids: Vec<Snowflake>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// State of one backing service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Healthy,
    Unhealthy,
    /// Not configured; the in-process fallback is used
    Disabled,
}

impl CheckStatus {
    pub fn from_probe(probe: Option<bool>) -> Self {
        match probe {
            Some(true) => Self::Healthy,
            Some(false) => Self::Unhealthy,
            None => Self::Disabled,
        }
    }
}

/// Health check status for each service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
    pub redis: CheckStatus,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

impl ReadinessResponse {
    /// `None` means the backend is not configured
    pub fn ready(database: Option<bool>, redis: Option<bool>) -> Self {
        let checks = HealthChecks {
            database: CheckStatus::from_probe(database),
            redis: CheckStatus::from_probe(redis),
        };
        let ready = checks.database != CheckStatus::Unhealthy && checks.redis != CheckStatus::Unhealthy;
        Self {
            status: if ready { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
