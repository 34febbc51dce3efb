//! Database models - SQLx-compatible structs for PostgreSQL tables

mod message;
mod notification;
mod user;
mod votable;

pub use message::{MessageModel, ReactionModel};
pub use notification::NotificationModel;
pub use user::UserModel;
pub use votable::VotableModel;
