//! Forum posts and replies, the entities that carry like/dislike votes

use chrono::{DateTime, Utc};

use crate::value_objects::{Snowflake, VotableKind, VoteKind, VoteState};

/// Like and dislike sets of a votable entity.
///
/// A user id is never in both sets at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Votes {
    likes: Vec<Snowflake>,
    dislikes: Vec<Snowflake>,
}

impl Votes {
    /// Build from stored sets. Duplicates are collapsed and a user listed in
    /// both sets keeps only the like.
    pub fn from_sets(likes: Vec<Snowflake>, dislikes: Vec<Snowflake>) -> Self {
        let mut votes = Self::default();
        for user in likes {
            if !votes.likes.contains(&user) {
                votes.likes.push(user);
            }
        }
        for user in dislikes {
            if !votes.likes.contains(&user) && !votes.dislikes.contains(&user) {
                votes.dislikes.push(user);
            }
        }
        votes
    }

    /// Apply a toggle for `user` and return the resulting state.
    pub fn apply(&mut self, user: Snowflake, kind: VoteKind) -> VoteState {
        match kind {
            VoteKind::Like => {
                if remove(&mut self.likes, user) {
                    VoteState::Neutral
                } else {
                    remove(&mut self.dislikes, user);
                    self.likes.push(user);
                    VoteState::Liked
                }
            }
            VoteKind::Dislike => {
                if remove(&mut self.dislikes, user) {
                    VoteState::Neutral
                } else {
                    remove(&mut self.likes, user);
                    self.dislikes.push(user);
                    VoteState::Disliked
                }
            }
            VoteKind::Remove => {
                remove(&mut self.likes, user);
                remove(&mut self.dislikes, user);
                VoteState::Neutral
            }
        }
    }

    pub fn state_of(&self, user: Snowflake) -> VoteState {
        if self.likes.contains(&user) {
            VoteState::Liked
        } else if self.dislikes.contains(&user) {
            VoteState::Disliked
        } else {
            VoteState::Neutral
        }
    }

    pub fn likes(&self) -> &[Snowflake] {
        &self.likes
    }

    pub fn dislikes(&self) -> &[Snowflake] {
        &self.dislikes
    }

    #[inline]
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    #[inline]
    pub fn dislike_count(&self) -> usize {
        self.dislikes.len()
    }
}

fn remove(set: &mut Vec<Snowflake>, user: Snowflake) -> bool {
    let before = set.len();
    set.retain(|id| *id != user);
    set.len() != before
}

/// A forum post or reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotableEntity {
    pub id: Snowflake,
    pub kind: VotableKind,
    pub author_id: Snowflake,
    /// Post a reply belongs to
    pub parent_id: Option<Snowflake>,
    pub category_id: Option<Snowflake>,
    /// Only posts carry a title
    pub title: Option<String>,
    pub content: String,
    pub votes: Votes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VotableEntity {
    pub fn new_post(
        id: Snowflake,
        author_id: Snowflake,
        category_id: Option<Snowflake>,
        title: String,
        content: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind: VotableKind::Post,
            author_id,
            parent_id: None,
            category_id,
            title: Some(title),
            content,
            votes: Votes::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn new_reply(id: Snowflake, post_id: Snowflake, author_id: Snowflake, content: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind: VotableKind::Reply,
            author_id,
            parent_id: Some(post_id),
            category_id: None,
            title: None,
            content,
            votes: Votes::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_post(&self) -> bool {
        self.kind == VotableKind::Post
    }

    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Replace title and body. Votes are left untouched.
    pub fn edit(&mut self, title: Option<String>, content: String) {
        if self.is_post() {
            if let Some(title) = title {
                self.title = Some(title);
            }
        }
        self.content = content;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> Snowflake {
        Snowflake::new(id)
    }

    #[test]
    fn like_then_dislike_moves_the_vote() {
        let mut votes = Votes::default();
        assert_eq!(votes.apply(user(1), VoteKind::Like), VoteState::Liked);
        assert_eq!(votes.apply(user(1), VoteKind::Dislike), VoteState::Disliked);
        assert_eq!(votes.like_count(), 0);
        assert_eq!(votes.dislikes(), &[user(1)]);
    }

    #[test]
    fn like_toggles_back_and_forth() {
        let mut votes = Votes::default();
        votes.apply(user(1), VoteKind::Like);
        assert_eq!(votes.apply(user(1), VoteKind::Like), VoteState::Neutral);
        assert_eq!(votes.like_count(), 0);
        assert_eq!(votes.apply(user(1), VoteKind::Like), VoteState::Liked);
        assert_eq!(votes.like_count(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut votes = Votes::default();
        votes.apply(user(1), VoteKind::Dislike);
        votes.apply(user(2), VoteKind::Like);

        votes.apply(user(1), VoteKind::Remove);
        let once = votes.clone();
        votes.apply(user(1), VoteKind::Remove);

        assert_eq!(votes, once);
        assert_eq!(votes.state_of(user(1)), VoteState::Neutral);
        assert_eq!(votes.state_of(user(2)), VoteState::Liked);
    }

    #[test]
    fn never_in_both_sets() {
        let kinds = [VoteKind::Like, VoteKind::Dislike, VoteKind::Remove];
        let mut votes = Votes::default();
        for (step, kind) in kinds.iter().cycle().take(30).enumerate() {
            let who = user((step % 3) as i64);
            votes.apply(who, *kind);
            for id in votes.likes() {
                assert!(!votes.dislikes().contains(id));
            }
        }
    }

    #[test]
    fn from_sets_resolves_conflicts() {
        let votes = Votes::from_sets(vec![user(1), user(1)], vec![user(1), user(2)]);
        assert_eq!(votes.likes(), &[user(1)]);
        assert_eq!(votes.dislikes(), &[user(2)]);
    }

    #[test]
    fn edit_keeps_votes() {
        let mut post = VotableEntity::new_post(
            user(10),
            user(1),
            None,
            "Meetup".to_string(),
            "Saturday".to_string(),
        );
        post.votes.apply(user(2), VoteKind::Like);

        post.edit(Some("Meetup moved".to_string()), "Sunday".to_string());

        assert_eq!(post.title_or_empty(), "Meetup moved");
        assert_eq!(post.votes.state_of(user(2)), VoteState::Liked);
    }
}
