//! Application configuration structs
//!
//! Loaded from environment variables, with `.env` support through dotenvy.

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    /// `None` runs on the in-memory store
    pub database: Option<DatabaseConfig>,
    /// `None` keeps events and presence in-process
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
    pub notifications: NotificationConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Settings for verifying tokens minted by the identity provider
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

/// Fan-out limits and preview lengths
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotificationConfig {
    /// Most online users told about a new post
    #[serde(default = "default_new_post_audience_cap")]
    pub new_post_audience_cap: usize,
    #[serde(default = "default_feed_limit")]
    pub feed_default_limit: u32,
    #[serde(default = "default_feed_max_limit")]
    pub feed_max_limit: u32,
    #[serde(default = "default_reply_preview_chars")]
    pub reply_preview_chars: usize,
    #[serde(default = "default_mention_preview_chars")]
    pub mention_preview_chars: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            new_post_audience_cap: default_new_post_audience_cap(),
            feed_default_limit: default_feed_limit(),
            feed_max_limit: default_feed_max_limit(),
            reply_preview_chars: default_reply_preview_chars(),
            mention_preview_chars: default_mention_preview_chars(),
        }
    }
}

impl NotificationConfig {
    /// Clamp a requested feed size into `1..=feed_max_limit`
    #[must_use]
    pub fn feed_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.feed_default_limit)
            .clamp(1, self.feed_max_limit.max(1))
    }
}

// Default value functions
fn default_app_name() -> String {
    "agora".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_new_post_audience_cap() -> usize {
    50
}

fn default_feed_limit() -> u32 {
    50
}

fn default_feed_max_limit() -> u32 {
    100
}

fn default_reply_preview_chars() -> usize {
    50
}

fn default_mention_preview_chars() -> usize {
    100
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let database = match vars.get("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: vars
                    .parse("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: vars
                    .parse("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            }),
            None => None,
        };

        let redis = match vars.get("REDIS_URL") {
            Some(url) => Some(RedisConfig {
                url,
                max_connections: vars
                    .parse("REDIS_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_redis_max_connections),
            }),
            None => None,
        };

        let worker_id: u16 = vars.parse("WORKER_ID")?.unwrap_or(0);
        if worker_id >= 1024 {
            return Err(ConfigError::InvalidValue(
                "WORKER_ID",
                format!("{worker_id} is outside 0..1024"),
            ));
        }

        let notifications = NotificationConfig {
            new_post_audience_cap: vars
                .parse("NOTIFY_NEW_POST_AUDIENCE_CAP")?
                .unwrap_or_else(default_new_post_audience_cap),
            feed_default_limit: vars
                .parse("NOTIFY_FEED_DEFAULT_LIMIT")?
                .unwrap_or_else(default_feed_limit),
            feed_max_limit: vars
                .parse("NOTIFY_FEED_MAX_LIMIT")?
                .unwrap_or_else(default_feed_max_limit),
            reply_preview_chars: vars
                .parse("NOTIFY_REPLY_PREVIEW_CHARS")?
                .unwrap_or_else(default_reply_preview_chars),
            mention_preview_chars: vars
                .parse("NOTIFY_MENTION_PREVIEW_CHARS")?
                .unwrap_or_else(default_mention_preview_chars),
        };

        Ok(Self {
            app: AppSettings {
                name: vars.get("APP_NAME").unwrap_or_else(default_app_name),
                env: vars.parse("APP_ENV")?.unwrap_or_default(),
            },
            api: ServerConfig {
                host: vars.get("API_HOST").unwrap_or_else(default_host),
                port: vars.parse("API_PORT")?.ok_or(ConfigError::MissingVar("API_PORT"))?,
            },
            database,
            redis,
            jwt: JwtConfig {
                secret: vars
                    .get("JWT_SECRET")
                    .ok_or(ConfigError::MissingVar("JWT_SECRET"))?,
                access_token_expiry: vars
                    .parse("JWT_ACCESS_TOKEN_EXPIRY")?
                    .unwrap_or_else(default_access_token_expiry),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: vars
                    .parse("RATE_LIMIT_REQUESTS_PER_SECOND")?
                    .unwrap_or_else(default_requests_per_second),
                burst: vars.parse("RATE_LIMIT_BURST")?.unwrap_or_else(default_burst),
            },
            cors: CorsConfig {
                allowed_origins: vars
                    .get("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|origin| !origin.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig { worker_id },
            notifications,
        })
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn parse<T>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue(key, raw)),
            None => Ok(None),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const MINIMAL: &[(&str, &str)] = &[("API_PORT", "8080"), ("JWT_SECRET", "s3cret")];

    #[test]
    fn minimal_config_uses_defaults() {
        let config = load(MINIMAL).unwrap();
        assert_eq!(config.api.address(), "127.0.0.1:8080");
        assert!(config.database.is_none());
        assert!(config.redis.is_none());
        assert_eq!(config.app.env, Environment::Development);
        assert_eq!(config.notifications, NotificationConfig::default());
        assert_eq!(config.notifications.new_post_audience_cap, 50);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = load(&[("API_PORT", "8080")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("JWT_SECRET")));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("NOTIFY_FEED_MAX_LIMIT", "lots"));
        let err = load(&pairs).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("NOTIFY_FEED_MAX_LIMIT", _)));
    }

    #[test]
    fn worker_id_range_is_checked() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("WORKER_ID", "1024"));
        assert!(load(&pairs).is_err());
    }

    #[test]
    fn storage_sections_follow_urls() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("DATABASE_URL", "postgres://localhost/agora"));
        pairs.push(("REDIS_URL", "redis://localhost"));
        pairs.push(("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"));
        pairs.push(("APP_ENV", "production"));

        let config = load(&pairs).unwrap();
        assert_eq!(config.database.unwrap().max_connections, 20);
        assert_eq!(config.redis.unwrap().max_connections, 10);
        assert_eq!(config.cors.allowed_origins.len(), 2);
        assert!(config.app.env.is_production());
    }

    #[test]
    fn feed_limit_is_clamped() {
        let config = NotificationConfig::default();
        assert_eq!(config.feed_limit(None), 50);
        assert_eq!(config.feed_limit(Some(0)), 1);
        assert_eq!(config.feed_limit(Some(30)), 30);
        assert_eq!(config.feed_limit(Some(10_000)), 100);
    }
}
