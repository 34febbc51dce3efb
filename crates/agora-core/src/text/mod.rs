//! Text helpers used when composing notifications

mod mentions;
mod preview;

pub use mentions::extract_mentions;
pub use preview::preview;
