//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `WS_HUB` prefix and nested values use double underscores as separators.
//! Every value has a default, so an empty environment yields a runnable hub.
//!
//! # Example
//!
//! ```no_run
//! use ws_hub::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//!
//! println!("Hub listening on {:?}", config.server.socket_addr());
//! ```

mod error;
mod hub;
mod server;

pub use error::{ConfigError, ValidationError};
pub use hub::{HubConfig, MAX_MESSAGE_BYTES, MAX_QUEUE_CAPACITY};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, WebSocket path)
    #[serde(default)]
    pub server: ServerConfig,

    /// Hub configuration (queue capacity, frame size limit)
    #[serde(default)]
    pub hub: HubConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `WS_HUB` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    /// 5. Validates the result
    ///
    /// # Environment Variable Format
    ///
    /// - `WS_HUB__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `WS_HUB__HUB__INBOUND_QUEUE_CAPACITY=1024` -> `hub.inbound_queue_capacity = 1024`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadError` if values cannot be parsed into
    /// expected types, and `ConfigError::ValidationFailed` if they parse but
    /// are out of range.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config: Self = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("WS_HUB")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.hub.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
