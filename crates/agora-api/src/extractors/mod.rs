//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, path ids and the feed query.

mod auth;
mod path;
mod query;
mod validated;

pub use auth::AuthUser;
pub use path::{
    MemberReactionPath, MessageIdPath, NotificationIdPath, PostIdPath, ReactionPath, ReplyIdPath,
};
pub use query::FeedQuery;
pub use validated::ValidatedJson;
