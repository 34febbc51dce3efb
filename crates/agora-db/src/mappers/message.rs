//! ChatMessage <-> model mapper

use agora_core::entities::{ChatMessage, EmojiReaction};
use agora_core::value_objects::Snowflake;

use crate::models::{MessageModel, ReactionModel};

/// Combine a message row with its reaction rows.
///
/// Rows must be ordered by `created_at`; emojis keep the order in which
/// they were first used.
pub fn assemble_message(model: MessageModel, reactions: Vec<ReactionModel>) -> ChatMessage {
    let mut grouped: Vec<EmojiReaction> = Vec::new();
    for row in reactions {
        let user = Snowflake::new(row.user_id);
        match grouped.iter_mut().find(|r| r.emoji == row.emoji) {
            Some(entry) => entry.users.push(user),
            None => grouped.push(EmojiReaction {
                emoji: row.emoji,
                users: vec![user],
            }),
        }
    }

    ChatMessage {
        id: Snowflake::new(model.id),
        channel_id: Snowflake::new(model.channel_id),
        author_id: Snowflake::new(model.author_id),
        recipient_id: model.recipient_id.map(Snowflake::new),
        content: model.content,
        reactions: grouped,
        created_at: model.created_at,
        edited_at: model.edited_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reaction(emoji: &str, user: i64) -> ReactionModel {
        ReactionModel {
            emoji: emoji.to_string(),
            user_id: user,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn groups_by_first_use() {
        let model = MessageModel {
            id: 1,
            channel_id: 2,
            author_id: 3,
            recipient_id: None,
            content: "hi".to_string(),
            created_at: Utc::now(),
            edited_at: None,
        };
        let msg = assemble_message(
            model,
            vec![reaction("❤️", 7), reaction("👍", 8), reaction("❤️", 9)],
        );

        assert_eq!(msg.reactions.len(), 2);
        assert_eq!(msg.reactions[0].emoji, "❤️");
        assert_eq!(msg.reactions[0].users, vec![Snowflake::new(7), Snowflake::new(9)]);
        assert_eq!(msg.reactions[1].users, vec![Snowflake::new(8)]);
    }
}
