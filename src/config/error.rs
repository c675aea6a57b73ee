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
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid timeout for {0}")]
    InvalidTimeout(&'static str),

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Invalid base URL for provider {0}")]
    InvalidProviderUrl(String),

    #[error("Default provider {0} is not routable")]
    UnroutableDefaultProvider(String),

    #[error("Invalid webhook URL format")]
    InvalidWebhookUrl,

    #[error("Credit limit must be a finite number")]
    InvalidCreditLimit,

    #[error("Request body limit must be positive")]
    InvalidBodyLimit,
}
