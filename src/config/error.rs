//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind host: {0}")]
    InvalidHost(String),

    #[error("WebSocket path must start with '/': {0}")]
    InvalidWsPath(String),

    #[error("Inbound queue capacity must be between 1 and 65536")]
    InvalidQueueCapacity,

    #[error("Max message size must be between 1 byte and 16 MiB")]
    InvalidMessageSize,
}
