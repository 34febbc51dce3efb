//! Ports implemented by the storage, cache and identity adapters

mod collaborators;
mod repositories;

pub use collaborators::{
    NotificationEventSink, PresenceDirectory, ProfileRoleChecker, RoleChecker, UserDirectory,
};
pub use repositories::{
    MessageRepository, NotificationQuery, NotificationRepository, ReadTransition, RepoResult,
    VotableRepository,
};
