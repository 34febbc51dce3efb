//! Server setup and initialization
//!
//! Wires storage, presence and the event transport according to which
//! backends are configured, then builds and runs the application.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use agora_cache::{EventRelay, Publisher, RedisPool, RedisPresence, SubscriberConfig};
use agora_common::{AppConfig, AppError, JwtService};
use agora_core::traits::NotificationRepository;
use agora_core::SnowflakeGenerator;
use agora_db::{
    create_pool, run_migrations, MemoryStore, PgMessageRepository, PgNotificationRepository,
    PgUserDirectory, PgVotableRepository,
};
use agora_service::{NotificationHub, ServiceContextBuilder, UnreadCountProjector};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );
    let health = apply_middleware(health_routes());

    api.merge(health).with_state(state)
}

/// Application state plus the background relay that must outlive the server
pub struct AppRuntime {
    pub state: AppState,
    pub relay: Option<EventRelay>,
}

/// State for a process that keeps everything in memory
pub fn in_memory_state(config: AppConfig, store: Arc<MemoryStore>) -> Result<AppState, AppError> {
    let hub = NotificationHub::default();
    let service_context = ServiceContextBuilder::new()
        .votable_repo(store.clone())
        .message_repo(store.clone())
        .notification_repo(store.clone())
        .user_directory(store.clone())
        .presence(store.clone())
        .event_sink(Arc::new(hub.clone()))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .settings(config.notifications.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));
    let projector = UnreadCountProjector::new(hub, store);

    Ok(AppState::new(service_context, config, jwt_service, projector))
}

/// Initialize all dependencies and create the runtime
pub async fn create_app_state(config: AppConfig) -> Result<AppRuntime, AppError> {
    let hub = NotificationHub::default();
    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let mut builder = ServiceContextBuilder::new()
        .snowflake_generator(snowflake_generator)
        .settings(config.notifications.clone());

    let notifications: Arc<dyn NotificationRepository>;
    let mut database = None;

    match &config.database {
        Some(db_config) => {
            info!("Connecting to PostgreSQL...");
            let pool = create_pool(&agora_db::DatabaseConfig::from(db_config))
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            run_migrations(&pool)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");

            notifications = Arc::new(PgNotificationRepository::new(pool.clone()));
            builder = builder
                .votable_repo(Arc::new(PgVotableRepository::new(pool.clone())))
                .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
                .user_directory(Arc::new(PgUserDirectory::new(pool.clone())))
                // Replaced by Redis presence when configured
                .presence(MemoryStore::new_shared());
            database = Some(pool);
        }
        None => {
            warn!("DATABASE_URL not set, using the in-memory store");
            let store = MemoryStore::new_shared();
            notifications = store.clone();
            builder = builder
                .votable_repo(store.clone())
                .message_repo(store.clone())
                .user_directory(store.clone())
                .presence(store);
        }
    }
    builder = builder.notification_repo(notifications.clone());

    let mut redis = None;
    let mut relay = None;

    match &config.redis {
        Some(redis_config) => {
            info!("Connecting to Redis...");
            let pool = RedisPool::from_config(redis_config)
                .map_err(|e| AppError::Cache(e.to_string()))?;
            pool.health_check()
                .await
                .map_err(|e| AppError::Cache(e.to_string()))?;
            info!("Redis connection established");

            builder = builder
                .presence(Arc::new(RedisPresence::new(pool.clone())))
                .event_sink(Arc::new(Publisher::new(pool.clone())));

            // Every instance feeds published events back into its own hub
            relay = Some(EventRelay::spawn(
                SubscriberConfig {
                    redis_url: pool.url().to_string(),
                    ..Default::default()
                },
                Arc::new(hub.clone()),
            ));
            redis = Some(pool);
        }
        None => {
            info!("REDIS_URL not set, notification events stay in-process");
            builder = builder.event_sink(Arc::new(hub.clone()));
        }
    }

    let service_context = builder
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;
    let projector = UnreadCountProjector::new(hub, notifications);

    let mut state = AppState::new(service_context, config, jwt_service, projector);
    if let Some(pool) = database {
        state = state.with_database(pool);
    }
    if let Some(pool) = redis {
        state = state.with_redis(pool);
    }

    Ok(AppRuntime { state, relay })
}

/// Run the HTTP server until ctrl-c
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid API address: {e}")))?;

    let AppRuntime { state, relay } = create_app_state(config).await?;
    let app = create_app(state);

    let result = run_server(app, addr).await;

    if let Some(relay) = relay {
        if let Err(e) = relay.shutdown().await {
            warn!(error = %e, "Event relay did not shut down cleanly");
        }
    }

    result
}
