//! Chat message entity with per-emoji reaction sets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Users who reacted to a message with one emoji
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiReaction {
    pub emoji: String,
    pub users: Vec<Snowflake>,
}

/// Outcome of a reaction toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionChange {
    Added,
    Removed,
}

impl ReactionChange {
    #[inline]
    pub fn is_addition(self) -> bool {
        self == Self::Added
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub author_id: Snowflake,
    /// Set for direct messages
    pub recipient_id: Option<Snowflake>,
    pub content: String,
    pub reactions: Vec<EmojiReaction>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new(id: Snowflake, channel_id: Snowflake, author_id: Snowflake, content: String) -> Self {
        Self {
            id,
            channel_id,
            author_id,
            recipient_id: None,
            content,
            reactions: Vec::new(),
            created_at: Utc::now(),
            edited_at: None,
        }
    }

    pub fn direct(
        id: Snowflake,
        channel_id: Snowflake,
        author_id: Snowflake,
        recipient_id: Snowflake,
        content: String,
    ) -> Self {
        Self {
            recipient_id: Some(recipient_id),
            ..Self::new(id, channel_id, author_id, content)
        }
    }

    pub fn edit(&mut self, content: String) {
        self.content = content;
        self.edited_at = Some(Utc::now());
    }

    /// Add or withdraw `user`'s `emoji` reaction.
    ///
    /// Entries whose user set becomes empty are dropped.
    pub fn toggle_reaction(&mut self, user: Snowflake, emoji: &str) -> ReactionChange {
        match self.reactions.iter().position(|r| r.emoji == emoji) {
            Some(idx) => {
                let entry = &mut self.reactions[idx];
                if let Some(pos) = entry.users.iter().position(|id| *id == user) {
                    entry.users.remove(pos);
                    if entry.users.is_empty() {
                        self.reactions.remove(idx);
                    }
                    ReactionChange::Removed
                } else {
                    entry.users.push(user);
                    ReactionChange::Added
                }
            }
            None => {
                self.reactions.push(EmojiReaction {
                    emoji: emoji.to_string(),
                    users: vec![user],
                });
                ReactionChange::Added
            }
        }
    }

    /// Remove `user`'s `emoji` reaction if present. Returns whether anything changed.
    pub fn remove_reaction(&mut self, user: Snowflake, emoji: &str) -> bool {
        if self.has_reacted(user, emoji) {
            self.toggle_reaction(user, emoji);
            true
        } else {
            false
        }
    }

    pub fn has_reacted(&self, user: Snowflake, emoji: &str) -> bool {
        self.reactions
            .iter()
            .any(|r| r.emoji == emoji && r.users.contains(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ChatMessage {
        ChatMessage::new(
            Snowflake::new(1),
            Snowflake::new(100),
            Snowflake::new(200),
            "hello".to_string(),
        )
    }

    #[test]
    fn empty_entries_are_dropped() {
        let (b, c) = (Snowflake::new(2), Snowflake::new(3));
        let mut msg = message();

        assert_eq!(msg.toggle_reaction(b, "👍"), ReactionChange::Added);
        assert_eq!(msg.toggle_reaction(b, "👍"), ReactionChange::Removed);
        assert_eq!(msg.toggle_reaction(c, "❤️"), ReactionChange::Added);

        assert_eq!(
            msg.reactions,
            vec![EmojiReaction {
                emoji: "❤️".to_string(),
                users: vec![c],
            }]
        );
    }

    #[test]
    fn several_emojis_per_user() {
        let b = Snowflake::new(2);
        let mut msg = message();
        msg.toggle_reaction(b, "👍");
        msg.toggle_reaction(b, "🎉");

        assert!(msg.has_reacted(b, "👍"));
        assert!(msg.has_reacted(b, "🎉"));
        assert_eq!(msg.reactions.len(), 2);
    }

    #[test]
    fn second_user_joins_existing_entry() {
        let mut msg = message();
        msg.toggle_reaction(Snowflake::new(2), "👍");
        msg.toggle_reaction(Snowflake::new(3), "👍");

        assert_eq!(msg.reactions.len(), 1);
        assert_eq!(msg.reactions[0].users.len(), 2);
    }

    #[test]
    fn remove_reaction_only_removes() {
        let b = Snowflake::new(2);
        let mut msg = message();
        assert!(!msg.remove_reaction(b, "👍"));
        assert!(msg.reactions.is_empty());

        msg.toggle_reaction(b, "👍");
        assert!(msg.remove_reaction(b, "👍"));
        assert!(msg.reactions.is_empty());
    }

    #[test]
    fn direct_messages_have_a_recipient() {
        let dm = ChatMessage::direct(
            Snowflake::new(1),
            Snowflake::new(100),
            Snowflake::new(200),
            Snowflake::new(300),
            "hi".to_string(),
        );
        assert_eq!(dm.recipient_id, Some(Snowflake::new(300)));
        assert_eq!(message().recipient_id, None);
    }
}
