//! VotableEntity <-> model mapper

use agora_core::entities::{VotableEntity, Votes};
use agora_core::value_objects::{Snowflake, VotableKind};

use crate::models::VotableModel;

impl VotableModel {
    /// Convert a row into the domain entity of the given kind
    pub fn into_entity(self, kind: VotableKind) -> VotableEntity {
        VotableEntity {
            id: Snowflake::new(self.id),
            kind,
            author_id: Snowflake::new(self.author_id),
            parent_id: self.parent_id.map(Snowflake::new),
            category_id: self.category_id.map(Snowflake::new),
            title: self.title,
            content: self.content,
            votes: Votes::from_sets(
                self.likes.into_iter().map(Snowflake::new).collect(),
                self.dislikes.into_iter().map(Snowflake::new).collect(),
            ),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Bind-ready values of an entity
pub struct VotableInsert<'a> {
    pub id: i64,
    pub author_id: i64,
    pub parent_id: Option<i64>,
    pub category_id: Option<i64>,
    pub title: &'a str,
    pub content: &'a str,
    pub likes: Vec<i64>,
    pub dislikes: Vec<i64>,
}

impl<'a> VotableInsert<'a> {
    pub fn new(entity: &'a VotableEntity) -> Self {
        Self {
            id: entity.id.into_inner(),
            author_id: entity.author_id.into_inner(),
            parent_id: entity.parent_id.map(Snowflake::into_inner),
            category_id: entity.category_id.map(Snowflake::into_inner),
            title: entity.title_or_empty(),
            content: &entity.content,
            likes: entity.votes.likes().iter().map(|id| id.into_inner()).collect(),
            dislikes: entity.votes.dislikes().iter().map(|id| id.into_inner()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::value_objects::VoteState;
    use chrono::Utc;

    #[test]
    fn row_becomes_reply() {
        let model = VotableModel {
            id: 5,
            author_id: 1,
            parent_id: Some(4),
            category_id: None,
            title: None,
            content: "agreed".to_string(),
            likes: vec![2, 3],
            dislikes: vec![9],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let reply = model.into_entity(VotableKind::Reply);
        assert_eq!(reply.parent_id, Some(Snowflake::new(4)));
        assert_eq!(reply.votes.like_count(), 2);
        assert_eq!(reply.votes.state_of(Snowflake::new(9)), VoteState::Disliked);
    }
}
