//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! token verification, the unread-count projector and the backends probed
//! by the readiness check.

use std::sync::Arc;

use agora_cache::RedisPool;
use agora_common::{AppConfig, JwtService};
use agora_db::PgPool;
use agora_service::{ServiceContext, UnreadCountProjector};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    jwt_service: Arc<JwtService>,
    projector: UnreadCountProjector,
    database: Option<PgPool>,
    redis: Option<RedisPool>,
}

impl AppState {
    pub fn new(
        service_context: ServiceContext,
        config: AppConfig,
        jwt_service: Arc<JwtService>,
        projector: UnreadCountProjector,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            jwt_service,
            projector,
            database: None,
            redis: None,
        }
    }

    #[must_use]
    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.database = Some(pool);
        self
    }

    #[must_use]
    pub fn with_redis(mut self, pool: RedisPool) -> Self {
        self.redis = Some(pool);
        self
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn projector(&self) -> &UnreadCountProjector {
        &self.projector
    }

    /// `None` when running on the in-memory store
    pub fn database(&self) -> Option<&PgPool> {
        self.database.as_ref()
    }

    /// `None` when events and presence stay in-process
    pub fn redis(&self) -> Option<&RedisPool> {
        self.redis.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("database", &self.database.is_some())
            .field("redis", &self.redis.is_some())
            .finish_non_exhaustive()
    }
}
