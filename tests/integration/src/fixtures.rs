//! Test fixtures
//!
//! A small community: four members, one of them a moderator, plus helpers
//! that place forum content and chat messages directly in the store.

use std::sync::Arc;

use agora_core::traits::{MessageRepository, VotableRepository};
use agora_core::{ChatMessage, Snowflake, UserProfile, UserRole, VotableEntity};
use agora_db::MemoryStore;
use anyhow::Result;
use serde::Serialize;

pub const ANA: Snowflake = Snowflake::new(101);
pub const BOB: Snowflake = Snowflake::new(102);
pub const CID: Snowflake = Snowflake::new(103);
pub const MOD: Snowflake = Snowflake::new(104);

/// Chat channel used by seeded messages
pub const LOUNGE: Snowflake = Snowflake::new(900);

/// Store with the four seeded members
pub fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new_shared();
    store.add_user(UserProfile::new(ANA, "ana"));
    store.add_user(UserProfile::new(BOB, "bob").with_display_name("Bob B."));
    store.add_user(UserProfile::new(CID, "cid"));
    store.add_user(UserProfile::new(MOD, "mod").with_role(UserRole::Moderator));
    store
}

pub async fn seed_post(
    store: &MemoryStore,
    id: i64,
    author: Snowflake,
    title: &str,
    content: &str,
) -> Result<Snowflake> {
    let post = VotableEntity::new_post(
        Snowflake::new(id),
        author,
        None,
        title.to_string(),
        content.to_string(),
    );
    VotableRepository::create(store, &post).await?;
    Ok(post.id)
}

pub async fn seed_reply(
    store: &MemoryStore,
    id: i64,
    post_id: Snowflake,
    author: Snowflake,
    content: &str,
) -> Result<Snowflake> {
    let reply = VotableEntity::new_reply(Snowflake::new(id), post_id, author, content.to_string());
    VotableRepository::create(store, &reply).await?;
    Ok(reply.id)
}

/// Channel message, or a direct message when `recipient` is set
pub async fn seed_message(
    store: &MemoryStore,
    id: i64,
    author: Snowflake,
    recipient: Option<Snowflake>,
    content: &str,
) -> Result<Snowflake> {
    let message = match recipient {
        Some(recipient) => ChatMessage::direct(
            Snowflake::new(id),
            LOUNGE,
            author,
            recipient,
            content.to_string(),
        ),
        None => ChatMessage::new(Snowflake::new(id), LOUNGE, author, content.to_string()),
    };
    MessageRepository::create(store, &message).await?;
    Ok(message.id)
}

/// Vote request body
#[derive(Debug, Serialize)]
pub struct VoteBody {
    pub kind: &'static str,
}

impl VoteBody {
    pub fn like() -> Self {
        Self { kind: "like" }
    }

    pub fn dislike() -> Self {
        Self { kind: "dislike" }
    }

    pub fn remove() -> Self {
        Self { kind: "remove" }
    }
}
