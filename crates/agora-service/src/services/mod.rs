//! Business logic services
//!
//! Reaction aggregation, notification fan-out and the read side, and the
//! activity entry points that drive the fan-out.

pub mod activity;
pub mod context;
pub mod error;
pub mod notification;
pub mod reaction;

// Re-export all services for convenience
pub use activity::ActivityService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use notification::{FanoutReport, NotificationOutcome, NotificationService};
pub use reaction::{ReactionService, MAX_EMOJI_BYTES};
