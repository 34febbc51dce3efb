//! Tracing and logging setup
//!
//! `RUST_LOG` overrides the configured level when present.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Environment;

/// Tracing configuration options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Default level when `RUST_LOG` is unset
    pub level: Level,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Log span open/close
    pub span_events: bool,
    pub file_line: bool,
    pub thread_names: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            span_events: false,
            file_line: true,
            thread_names: false,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            json: false,
            span_events: true,
            file_line: true,
            thread_names: true,
        }
    }

    #[must_use]
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            json: true,
            span_events: false,
            file_line: false,
            thread_names: false,
        }
    }

    /// Pick a preset for the environment. `LOG_FORMAT=json|pretty` overrides the output format.
    #[must_use]
    pub fn for_environment(env: Environment, log_format: Option<&str>) -> Self {
        let mut config = match env {
            Environment::Development => Self::development(),
            Environment::Staging => Self::default(),
            Environment::Production => Self::production(),
        };
        match log_format {
            Some(format) if format.eq_ignore_ascii_case("json") => config.json = true,
            Some(format) if format.eq_ignore_ascii_case("pretty") => config.json = false,
            _ => {}
        }
        config
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Initialize tracing with the default configuration
///
/// # Panics
/// Panics if a global subscriber is already set.
pub fn init_tracing() {
    if let Err(e) = try_init_tracing(&TracingConfig::default()) {
        panic!("{e}");
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn try_init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let fmt_layer = fmt::layer()
        .with_file(config.file_line)
        .with_line_number(config.file_line)
        .with_thread_names(config.thread_names)
        .with_span_events(config.span_events());

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.json {
        registry.with(fmt_layer.json()).try_init()
    } else {
        registry.with(fmt_layer).try_init()
    };
    result.map_err(|_| TracingError::AlreadyInitialized)
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert_eq!(TracingConfig::development().level, Level::DEBUG);
        assert!(TracingConfig::production().json);
        assert!(!TracingConfig::default().json);
    }

    #[test]
    fn log_format_overrides_preset() {
        let config = TracingConfig::for_environment(Environment::Development, Some("JSON"));
        assert!(config.json);
        assert_eq!(config.level, Level::DEBUG);

        let config = TracingConfig::for_environment(Environment::Production, Some("pretty"));
        assert!(!config.json);

        let config = TracingConfig::for_environment(Environment::Staging, None);
        assert_eq!(config, TracingConfig::default());
    }

    #[test]
    fn second_init_reports_error() {
        let config = TracingConfig::default();
        let _ = try_init_tracing(&config);
        assert!(try_init_tracing(&config).is_err());
    }
}
