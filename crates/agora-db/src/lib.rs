//! # agora-db
//!
//! Storage layer implementing the domain repository and directory traits.
//!
//! ## Overview
//!
//! Two backends are provided:
//!
//! - PostgreSQL via SQLx: connection pool, migrations, `FromRow` models,
//!   entity mappers and `Pg*` repositories
//! - [`MemoryStore`]: an in-process backend used when no database is
//!   configured and throughout the test suites
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agora_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use agora_db::PgNotificationRepository;
//! use agora_core::traits::NotificationRepository;
//!
//! async fn example(url: String) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig { url, ..Default::default() };
//!     let pool = create_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     let notifications = PgNotificationRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgMessageRepository, PgNotificationRepository, PgUserDirectory, PgVotableRepository,
};
