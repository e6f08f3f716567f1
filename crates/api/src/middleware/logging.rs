//! Logging initialization and configuration.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Builds the level filter. `RUST_LOG` takes precedence over the configured level.
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Initializes the logging subsystem based on configuration.
///
/// `format = "json"` emits one JSON object per event; anything else uses the
/// human-readable pretty formatter.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let subscriber = tracing_subscriber::registry().with(env_filter(config));

    match config.format.as_str() {
        "json" => {
            let json_layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true);
            subscriber.with(json_layer).try_init()
        }
        _ => {
            let pretty_layer = fmt::layer()
                .pretty()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true);
            subscriber.with(pretty_layer).try_init()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_uses_configured_level() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        };
        assert_eq!(env_filter(&config).to_string(), "debug");
    }
}
