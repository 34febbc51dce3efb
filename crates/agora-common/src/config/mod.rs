//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    NotificationConfig, RateLimitConfig, RedisConfig, ServerConfig, SnowflakeConfig,
};
