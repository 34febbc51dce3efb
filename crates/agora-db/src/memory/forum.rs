//! Posts, replies and chat messages

use async_trait::async_trait;
use dashmap::DashMap;

use agora_core::entities::{ChatMessage, ReactionChange, VotableEntity};
use agora_core::traits::{MessageRepository, RepoResult, VotableRepository};
use agora_core::value_objects::{Snowflake, VotableKind, VoteKind};

use super::MemoryStore;

impl MemoryStore {
    fn votables(&self, kind: VotableKind) -> &DashMap<Snowflake, VotableEntity> {
        match kind {
            VotableKind::Post => &self.posts,
            VotableKind::Reply => &self.replies,
        }
    }
}

#[async_trait]
impl VotableRepository for MemoryStore {
    async fn find_by_id(
        &self,
        kind: VotableKind,
        id: Snowflake,
    ) -> RepoResult<Option<VotableEntity>> {
        Ok(self.votables(kind).get(&id).map(|e| e.value().clone()))
    }

    async fn create(&self, entity: &VotableEntity) -> RepoResult<()> {
        self.votables(entity.kind).insert(entity.id, entity.clone());
        Ok(())
    }

    async fn update_content(
        &self,
        kind: VotableKind,
        id: Snowflake,
        title: Option<&str>,
        content: &str,
    ) -> RepoResult<bool> {
        let Some(mut entry) = self.votables(kind).get_mut(&id) else {
            return Ok(false);
        };
        entry.edit(title.map(str::to_string), content.to_string());
        Ok(true)
    }

    async fn delete(&self, kind: VotableKind, id: Snowflake) -> RepoResult<bool> {
        let removed = self.votables(kind).remove(&id).is_some();
        if removed && kind == VotableKind::Post {
            self.replies.retain(|_, reply| reply.parent_id != Some(id));
        }
        Ok(removed)
    }

    async fn apply_vote(
        &self,
        kind: VotableKind,
        id: Snowflake,
        user_id: Snowflake,
        vote: VoteKind,
    ) -> RepoResult<Option<VotableEntity>> {
        let Some(mut entry) = self.votables(kind).get_mut(&id) else {
            return Ok(None);
        };
        entry.votes.apply(user_id, vote);
        Ok(Some(entry.value().clone()))
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ChatMessage>> {
        Ok(self.messages.get(&id).map(|m| m.value().clone()))
    }

    async fn create(&self, message: &ChatMessage) -> RepoResult<()> {
        self.messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn toggle_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<Option<(ReactionChange, ChatMessage)>> {
        let Some(mut entry) = self.messages.get_mut(&message_id) else {
            return Ok(None);
        };
        let change = entry.toggle_reaction(user_id, emoji);
        Ok(Some((change, entry.value().clone())))
    }

    async fn remove_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<Option<(bool, ChatMessage)>> {
        let Some(mut entry) = self.messages.get_mut(&message_id) else {
            return Ok(None);
        };
        let removed = entry.remove_reaction(user_id, emoji);
        Ok(Some((removed, entry.value().clone())))
    }
}
