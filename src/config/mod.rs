//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `SUCCESSION` prefix and
//! `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use chapter_succession::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod scoring;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use scoring::ScoringConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl AppConfig {
    /// Loads `.env` if present, then reads `SUCCESSION__*` variables.
    ///
    /// - `SUCCESSION__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SUCCESSION__DATABASE__URL=...` -> `database.url = ...`
    /// - `SUCCESSION__SCORING__PARTIAL_SCORING_POLICY=renormalize`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SUCCESSION")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
