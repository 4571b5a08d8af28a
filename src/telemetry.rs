//! Tracing subscriber setup for the binary.

use thiserror::Error;
use tracing_subscriber::{filter::ParseError, EnvFilter};

use crate::config::ServerConfig;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

/// Builds the filter from `RUST_LOG`, falling back to `server.log_level`.
pub fn env_filter(config: &ServerConfig) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::EnvFilter {
            value: config.log_level.clone(),
            source,
        }),
    }
}

/// Installs the global subscriber: JSON lines when `json_logs` is set,
/// compact text otherwise.
pub fn init(config: &ServerConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if config.json_logs {
        builder.json().with_current_span(false).try_init()
    } else {
        builder.compact().with_target(false).try_init()
    };
    result.map_err(|e| TelemetryError::Subscriber(e.to_string()))
}
