//! Application error types
//!
//! Unified error handling for infrastructure and transport concerns.

use agora_core::DomainError;
use serde::Serialize;
use std::fmt;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authentication")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Rate limiting
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::InvalidToken | Self::TokenExpired | Self::MissingAuth => 401,
            Self::InsufficientPermissions => 403,
            Self::NotFound(_) => 404,
            Self::RateLimitExceeded => 429,
            Self::Database(_) | Self::Cache(_) | Self::Internal(_) | Self::Config(_) => 500,
            Self::Domain(e) => domain_status(e),
        }
    }

    /// Error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "invalid-token",
            Self::TokenExpired => "token-expired",
            Self::MissingAuth => "not-authorized",
            Self::InsufficientPermissions => "missing-capability",
            Self::Validation(_) => "validation-error",
            Self::NotFound(_) => "not-found",
            Self::RateLimitExceeded => "rate-limit-exceeded",
            Self::Database(_) => "database-error",
            Self::Cache(_) => "cache-error",
            Self::Internal(_) => "internal-error",
            Self::Config(_) => "config-error",
            Self::Domain(e) => e.code(),
        }
    }

    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code())
    }

    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Status code for a domain error
#[must_use]
pub fn domain_status(err: &DomainError) -> u16 {
    match err {
        DomainError::NotAuthorized => 401,
        DomainError::MissingCapability(_) => 403,
        e if e.is_not_found() => 404,
        e if e.is_validation() => 400,
        _ => 500,
    }
}

/// Error body returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
            details: None,
        }
    }
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        Self::from(&err)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::Snowflake;

    #[test]
    fn status_codes() {
        assert_eq!(AppError::MissingAuth.status_code(), 401);
        assert_eq!(AppError::InsufficientPermissions.status_code(), 403);
        assert_eq!(AppError::not_found("notification").status_code(), 404);
        assert_eq!(AppError::validation("bad").status_code(), 400);
        assert_eq!(AppError::Cache("down".into()).status_code(), 500);
    }

    #[test]
    fn domain_errors_keep_their_codes() {
        let err = AppError::from(DomainError::ReplyNotFound(Snowflake::new(3)));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "reply-not-found");

        let err = AppError::from(DomainError::NotAuthorized);
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.error_code(), "not-authorized");

        let err = AppError::from(DomainError::MissingCapability("moderator"));
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn error_response_body() {
        let response = ErrorResponse::from(&AppError::not_found("notification 9"));
        assert_eq!(response.code, "not-found");
        assert_eq!(response.message, "Resource not found: notification 9");
        assert!(response.details.is_none());
    }

    #[test]
    fn classification() {
        assert!(AppError::MissingAuth.is_client_error());
        assert!(AppError::Database("x".into()).is_server_error());
        assert!(!AppError::TokenExpired.is_server_error());
    }
}
