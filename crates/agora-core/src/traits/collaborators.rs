//! External collaborators: user directory, presence, capabilities, event sink

use async_trait::async_trait;

use crate::entities::{UserProfile, UserRole};
use crate::events::NotificationEvent;
use crate::traits::RepoResult;
use crate::value_objects::Snowflake;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<UserProfile>>;

    /// Exact, case-sensitive username lookup. Unknown names are skipped.
    async fn find_by_usernames(&self, usernames: &[String]) -> RepoResult<Vec<UserProfile>>;
}

#[async_trait]
pub trait PresenceDirectory: Send + Sync {
    /// Currently online users, at most `limit` of them
    async fn online_users(&self, limit: usize) -> RepoResult<Vec<Snowflake>>;

    /// Register one more live connection for `user_id` and refresh their heartbeat
    async fn add_session(&self, user_id: Snowflake) -> RepoResult<()>;

    /// Refresh the heartbeat without touching the connection count
    async fn mark_online(&self, user_id: Snowflake) -> RepoResult<()>;

    /// Drop one live connection. The user goes offline once none remain.
    async fn remove_session(&self, user_id: Snowflake) -> RepoResult<()>;
}

/// Capability predicates consulted for moderation actions
pub trait RoleChecker: Send + Sync {
    fn is_moderator(&self, user: &UserProfile) -> bool;

    fn is_admin(&self, user: &UserProfile) -> bool;

    fn can_moderate(&self, user: &UserProfile) -> bool {
        self.is_moderator(user) || self.is_admin(user)
    }
}

/// Reads the role reported by the user directory
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileRoleChecker;

impl RoleChecker for ProfileRoleChecker {
    fn is_moderator(&self, user: &UserProfile) -> bool {
        user.role == UserRole::Moderator
    }

    fn is_admin(&self, user: &UserProfile) -> bool {
        user.role == UserRole::Admin
    }
}

/// Destination of notification lifecycle events
#[async_trait]
pub trait NotificationEventSink: Send + Sync {
    async fn emit(&self, event: NotificationEvent) -> RepoResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admins_can_moderate() {
        let checker = ProfileRoleChecker;
        let member = UserProfile::new(Snowflake::new(1), "m");
        let moderator = member.clone().with_role(UserRole::Moderator);
        let admin = member.clone().with_role(UserRole::Admin);

        assert!(!checker.can_moderate(&member));
        assert!(checker.can_moderate(&moderator));
        assert!(checker.can_moderate(&admin));
        assert!(!checker.is_moderator(&admin));
    }
}
