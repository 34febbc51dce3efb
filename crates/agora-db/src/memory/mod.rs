//! In-process storage backend
//!
//! Implements every storage and directory trait on top of `DashMap` so the
//! service can run without PostgreSQL (local development, tests). Each
//! mutation holds the entry's shard lock for its whole read-modify-write,
//! which gives the same per-record atomicity as the single-statement SQL
//! updates.

mod directory;
mod forum;
mod notifications;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;

use agora_core::entities::{ChatMessage, Notification, UserProfile, VotableEntity};
use agora_core::value_objects::Snowflake;

/// Presence entries older than this are treated as offline
pub const DEFAULT_PRESENCE_TTL_SECS: i64 = 300;

#[derive(Debug, Clone, Copy)]
struct PresenceEntry {
    last_seen: DateTime<Utc>,
    /// Open live connections
    sessions: usize,
}

pub struct MemoryStore {
    posts: DashMap<Snowflake, VotableEntity>,
    replies: DashMap<Snowflake, VotableEntity>,
    messages: DashMap<Snowflake, ChatMessage>,
    notifications: DashMap<Snowflake, Notification>,
    users: DashMap<Snowflake, UserProfile>,
    presence: RwLock<HashMap<Snowflake, PresenceEntry>>,
    presence_ttl: Duration,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_presence_ttl(Duration::seconds(DEFAULT_PRESENCE_TTL_SECS))
    }

    #[must_use]
    pub fn with_presence_ttl(presence_ttl: Duration) -> Self {
        Self {
            posts: DashMap::new(),
            replies: DashMap::new(),
            messages: DashMap::new(),
            notifications: DashMap::new(),
            users: DashMap::new(),
            presence: RwLock::new(HashMap::new()),
            presence_ttl,
        }
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register or replace a user profile
    pub fn add_user(&self, profile: UserProfile) {
        tracing::debug!(user_id = %profile.id, username = %profile.username, "User registered");
        self.users.insert(profile.id, profile);
    }

    /// Record a heartbeat for `user_id` at `at`
    pub fn set_online(&self, user_id: Snowflake, at: DateTime<Utc>) {
        self.presence
            .write()
            .entry(user_id)
            .and_modify(|entry| entry.last_seen = at)
            .or_insert(PresenceEntry {
                last_seen: at,
                sessions: 0,
            });
    }

    /// Open live connections held by `user_id`
    #[must_use]
    pub fn session_count(&self, user_id: Snowflake) -> usize {
        self.presence
            .read()
            .get(&user_id)
            .map_or(0, |entry| entry.sessions)
    }

    /// Number of stored notifications across all recipients
    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.notifications.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
