//! Entity to model mappers
//!
//! - `From`/`TryFrom<Model>` and `into_entity`: database rows to domain objects
//! - `*Insert` structs: entity data prepared for binding

mod message;
mod notification;
mod user;
mod votable;

pub use message::assemble_message;
pub use notification::NotificationInsert;
pub use votable::VotableInsert;
