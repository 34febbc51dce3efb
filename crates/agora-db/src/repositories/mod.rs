//! Repository implementations - PostgreSQL adapters for the domain traits

mod error;
mod message;
mod notification;
mod user;
mod votable;

pub use error::{map_db_error, map_unique_violation};
pub use message::PgMessageRepository;
pub use notification::PgNotificationRepository;
pub use user::PgUserDirectory;
pub use votable::PgVotableRepository;
