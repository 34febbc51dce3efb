//! Online-user directory in Redis.
//!
//! All online users live in one sorted set scored by their last heartbeat
//! (Unix seconds). Entries older than the TTL count as offline and are
//! pruned lazily on read. A companion hash counts each user's open live
//! connections; the user leaves the sorted set when the count reaches zero.

use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;

use agora_core::traits::{PresenceDirectory, RepoResult};
use agora_core::Snowflake;

use crate::pool::{RedisPool, RedisResult};

/// Sorted set holding online users
const ONLINE_KEY: &str = "presence:online";

/// Hash of user -> open connection count
const SESSIONS_KEY: &str = "presence:sessions";

/// Presence TTL (5 minutes - refreshed by heartbeat)
pub const PRESENCE_TTL: i64 = 300;

/// Redis-backed presence directory
#[derive(Clone)]
pub struct RedisPresence {
    pool: RedisPool,
    ttl_seconds: i64,
}

impl RedisPresence {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self::with_ttl(pool, PRESENCE_TTL)
    }

    #[must_use]
    pub fn with_ttl(pool: RedisPool, ttl_seconds: i64) -> Self {
        Self { pool, ttl_seconds }
    }

    fn cutoff(&self) -> i64 {
        Utc::now().timestamp() - self.ttl_seconds
    }

    async fn heartbeat(&self, user_id: Snowflake) -> RedisResult<()> {
        let mut conn = self.pool.get().await?;
        conn.zadd::<_, _, _, ()>(ONLINE_KEY, user_id.into_inner(), Utc::now().timestamp())
            .await?;
        Ok(())
    }

    async fn open_session(&self, user_id: Snowflake) -> RedisResult<i64> {
        let mut conn = self.pool.get().await?;
        let (sessions,): (i64,) = redis::pipe()
            .atomic()
            .hincr(SESSIONS_KEY, user_id.into_inner(), 1)
            .zadd(ONLINE_KEY, user_id.into_inner(), Utc::now().timestamp())
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(sessions)
    }

    async fn close_session(&self, user_id: Snowflake) -> RedisResult<i64> {
        let mut conn = self.pool.get().await?;
        let remaining: i64 = conn.hincr(SESSIONS_KEY, user_id.into_inner(), -1).await?;
        if remaining <= 0 {
            redis::pipe()
                .atomic()
                .hdel(SESSIONS_KEY, user_id.into_inner())
                .ignore()
                .zrem(ONLINE_KEY, user_id.into_inner())
                .ignore()
                .query_async::<()>(&mut conn)
                .await?;
        }
        Ok(remaining.max(0))
    }

    async fn fetch_online(&self, limit: usize) -> RedisResult<Vec<Snowflake>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let cutoff = self.cutoff();
        let mut conn = self.pool.get().await?;

        conn.zrembyscore::<_, _, _, ()>(ONLINE_KEY, "-inf", format!("({cutoff}"))
            .await?;
        let ids: Vec<i64> = conn
            .zrevrangebyscore_limit(ONLINE_KEY, "+inf", cutoff, 0, limit as isize)
            .await?;

        Ok(ids.into_iter().map(Snowflake::new).collect())
    }
}

#[async_trait]
impl PresenceDirectory for RedisPresence {
    async fn online_users(&self, limit: usize) -> RepoResult<Vec<Snowflake>> {
        Ok(self.fetch_online(limit).await?)
    }

    async fn add_session(&self, user_id: Snowflake) -> RepoResult<()> {
        let sessions = self.open_session(user_id).await?;
        tracing::debug!(user_id = %user_id, sessions, "Live session opened");
        Ok(())
    }

    async fn mark_online(&self, user_id: Snowflake) -> RepoResult<()> {
        self.heartbeat(user_id).await?;
        tracing::debug!(user_id = %user_id, "Presence refreshed");
        Ok(())
    }

    async fn remove_session(&self, user_id: Snowflake) -> RepoResult<()> {
        let remaining = self.close_session(user_id).await?;
        if remaining == 0 {
            tracing::debug!(user_id = %user_id, "User went offline");
        } else {
            tracing::debug!(user_id = %user_id, remaining, "Live session closed");
        }
        Ok(())
    }
}
