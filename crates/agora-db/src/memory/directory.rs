//! User directory and presence

use async_trait::async_trait;
use chrono::Utc;

use agora_core::entities::UserProfile;
use agora_core::traits::{PresenceDirectory, RepoResult, UserDirectory};
use agora_core::value_objects::Snowflake;

use super::{MemoryStore, PresenceEntry};

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<UserProfile>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_usernames(&self, usernames: &[String]) -> RepoResult<Vec<UserProfile>> {
        Ok(self
            .users
            .iter()
            .filter(|u| usernames.iter().any(|name| *name == u.username))
            .map(|u| u.value().clone())
            .collect())
    }
}

#[async_trait]
impl PresenceDirectory for MemoryStore {
    async fn online_users(&self, limit: usize) -> RepoResult<Vec<Snowflake>> {
        let cutoff = Utc::now() - self.presence_ttl;
        let presence = self.presence.read();

        let mut online: Vec<_> = presence
            .iter()
            .filter(|(_, entry)| entry.last_seen >= cutoff)
            .map(|(user, entry)| (*user, entry.last_seen))
            .collect();
        // Most recently active first
        online.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        Ok(online.into_iter().take(limit).map(|(user, _)| user).collect())
    }

    async fn add_session(&self, user_id: Snowflake) -> RepoResult<()> {
        let now = Utc::now();
        let mut presence = self.presence.write();
        let entry = presence.entry(user_id).or_insert(PresenceEntry {
            last_seen: now,
            sessions: 0,
        });
        entry.last_seen = now;
        entry.sessions += 1;
        Ok(())
    }

    async fn mark_online(&self, user_id: Snowflake) -> RepoResult<()> {
        self.set_online(user_id, Utc::now());
        Ok(())
    }

    async fn remove_session(&self, user_id: Snowflake) -> RepoResult<()> {
        let mut presence = self.presence.write();
        if let Some(entry) = presence.get_mut(&user_id) {
            entry.sessions = entry.sessions.saturating_sub(1);
            if entry.sessions == 0 {
                presence.remove(&user_id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn usernames_match_exactly() {
        let store = MemoryStore::new();
        store.add_user(UserProfile::new(Snowflake::new(1), "ana"));
        store.add_user(UserProfile::new(Snowflake::new(2), "Bob"));

        let found = store
            .find_by_usernames(&["ana".to_string(), "bob".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, Snowflake::new(1));
    }

    #[tokio::test]
    async fn stale_presence_is_offline() {
        let store = MemoryStore::new();
        store.set_online(Snowflake::new(1), Utc::now());
        store.set_online(Snowflake::new(2), Utc::now() - Duration::seconds(600));
        store.set_online(Snowflake::new(3), Utc::now() - Duration::seconds(10));

        let online = store.online_users(10).await.unwrap();
        assert_eq!(online, vec![Snowflake::new(1), Snowflake::new(3)]);

        store.remove_session(Snowflake::new(1)).await.unwrap();
        assert_eq!(store.online_users(10).await.unwrap(), vec![Snowflake::new(3)]);
    }

    #[tokio::test]
    async fn user_stays_online_until_last_session_closes() {
        let store = MemoryStore::new();
        let ana = Snowflake::new(1);
        store.add_session(ana).await.unwrap();
        store.add_session(ana).await.unwrap();
        assert_eq!(store.session_count(ana), 2);

        store.remove_session(ana).await.unwrap();
        assert_eq!(store.session_count(ana), 1);
        assert_eq!(store.online_users(10).await.unwrap(), vec![ana]);

        store.mark_online(ana).await.unwrap();
        assert_eq!(store.session_count(ana), 1);

        store.remove_session(ana).await.unwrap();
        assert!(store.online_users(10).await.unwrap().is_empty());

        // Extra closes are harmless
        store.remove_session(ana).await.unwrap();
        assert_eq!(store.session_count(ana), 0);
    }

    #[tokio::test]
    async fn online_users_respects_limit() {
        let store = MemoryStore::new();
        for id in 1..=5 {
            store.mark_online(Snowflake::new(id)).await.unwrap();
        }
        assert_eq!(store.online_users(2).await.unwrap().len(), 2);
    }
}
