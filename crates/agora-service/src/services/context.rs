//! Service context - dependency container for services
//!
//! Holds the storage ports, directories, event sink and settings the services
//! need. Everything is a trait object so the same services run on PostgreSQL
//! and Redis in production and on the in-memory store in development.

use std::sync::Arc;

use agora_common::NotificationConfig;
use agora_core::traits::{
    MessageRepository, NotificationEventSink, NotificationRepository, PresenceDirectory,
    RoleChecker, UserDirectory, VotableRepository,
};
use agora_core::{ProfileRoleChecker, Snowflake, SnowflakeGenerator};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Provides access to:
/// - Storage repositories (votables, messages, notifications)
/// - User and presence directories
/// - The role checker used for moderation capabilities
/// - The sink receiving notification lifecycle events
/// - Snowflake generator and notification settings
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    votable_repo: Arc<dyn VotableRepository>,
    message_repo: Arc<dyn MessageRepository>,
    notification_repo: Arc<dyn NotificationRepository>,

    // Directories
    user_directory: Arc<dyn UserDirectory>,
    presence: Arc<dyn PresenceDirectory>,
    role_checker: Arc<dyn RoleChecker>,

    // Events
    event_sink: Arc<dyn NotificationEventSink>,

    snowflake_generator: Arc<SnowflakeGenerator>,
    settings: NotificationConfig,
}

impl ServiceContext {
    // === Repositories ===

    pub fn votable_repo(&self) -> &dyn VotableRepository {
        self.votable_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn notification_repo(&self) -> &dyn NotificationRepository {
        self.notification_repo.as_ref()
    }

    /// Shared handle, for long-lived subscribers
    pub fn notification_repo_handle(&self) -> Arc<dyn NotificationRepository> {
        self.notification_repo.clone()
    }

    // === Directories ===

    pub fn user_directory(&self) -> &dyn UserDirectory {
        self.user_directory.as_ref()
    }

    pub fn presence(&self) -> &dyn PresenceDirectory {
        self.presence.as_ref()
    }

    pub fn role_checker(&self) -> &dyn RoleChecker {
        self.role_checker.as_ref()
    }

    // === Events ===

    pub fn event_sink(&self) -> &dyn NotificationEventSink {
        self.event_sink.as_ref()
    }

    // === Settings ===

    pub fn settings(&self) -> &NotificationConfig {
        &self.settings
    }

    /// Get the snowflake ID generator
    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("directories", &"...")
            .field("worker_id", &self.snowflake_generator.worker_id())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    votable_repo: Option<Arc<dyn VotableRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    notification_repo: Option<Arc<dyn NotificationRepository>>,
    user_directory: Option<Arc<dyn UserDirectory>>,
    presence: Option<Arc<dyn PresenceDirectory>>,
    role_checker: Option<Arc<dyn RoleChecker>>,
    event_sink: Option<Arc<dyn NotificationEventSink>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    settings: NotificationConfig,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            votable_repo: None,
            message_repo: None,
            notification_repo: None,
            user_directory: None,
            presence: None,
            role_checker: None,
            event_sink: None,
            snowflake_generator: None,
            settings: NotificationConfig::default(),
        }
    }

    pub fn votable_repo(mut self, repo: Arc<dyn VotableRepository>) -> Self {
        self.votable_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn notification_repo(mut self, repo: Arc<dyn NotificationRepository>) -> Self {
        self.notification_repo = Some(repo);
        self
    }

    pub fn user_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.user_directory = Some(directory);
        self
    }

    pub fn presence(mut self, presence: Arc<dyn PresenceDirectory>) -> Self {
        self.presence = Some(presence);
        self
    }

    /// Defaults to [`ProfileRoleChecker`]
    pub fn role_checker(mut self, checker: Arc<dyn RoleChecker>) -> Self {
        self.role_checker = Some(checker);
        self
    }

    pub fn event_sink(mut self, sink: Arc<dyn NotificationEventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn settings(mut self, settings: NotificationConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            votable_repo: self
                .votable_repo
                .ok_or_else(|| ServiceError::validation("votable_repo is required"))?,
            message_repo: self
                .message_repo
                .ok_or_else(|| ServiceError::validation("message_repo is required"))?,
            notification_repo: self
                .notification_repo
                .ok_or_else(|| ServiceError::validation("notification_repo is required"))?,
            user_directory: self
                .user_directory
                .ok_or_else(|| ServiceError::validation("user_directory is required"))?,
            presence: self
                .presence
                .ok_or_else(|| ServiceError::validation("presence is required"))?,
            role_checker: self
                .role_checker
                .unwrap_or_else(|| Arc::new(ProfileRoleChecker)),
            event_sink: self
                .event_sink
                .ok_or_else(|| ServiceError::validation("event_sink is required"))?,
            snowflake_generator: self
                .snowflake_generator
                .ok_or_else(|| ServiceError::validation("snowflake_generator is required"))?,
            settings: self.settings,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
