//! # agora-service
//!
//! Application layer: reaction aggregation, notification fan-out, the live
//! unread-count projector, and the DTOs exchanged with the API.

pub mod dto;
pub mod live;
pub mod services;

pub use live::{NotificationHub, UnreadCountProjector, UnreadSubscription};
pub use services::{
    ActivityService, FanoutReport, NotificationOutcome, NotificationService, ReactionService,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
};
