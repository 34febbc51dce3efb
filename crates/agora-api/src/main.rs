//! Agora API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p agora-api
//! ```
//!
//! Configuration is loaded from environment variables and an optional `.env` file.

use agora_common::{try_init_tracing, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let log_format = std::env::var("LOG_FORMAT").ok();
    let tracing_config = TracingConfig::for_environment(config.app.env, log_format.as_deref());
    if let Err(e) = try_init_tracing(&tracing_config) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        port = config.api.port,
        database = config.database.is_some(),
        redis = config.redis.is_some(),
        "Configuration loaded"
    );

    if let Err(e) = agora_api::run(config).await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
