//! Value objects - immutable types that represent domain concepts

mod snowflake;
mod vote;

pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
pub use vote::{VotableKind, VoteKind, VoteState};
