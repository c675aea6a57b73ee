//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `LLM_GATEWAY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use llm_gateway::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Gateway listening on {}", config.server.socket_addr().unwrap());
//! ```

mod alerts;
mod error;
mod limits;
mod providers;
mod redis;
mod server;
mod telemetry;

pub use alerts::AlertsConfig;
pub use error::{ConfigError, ValidationError};
pub use limits::LimitsConfig;
pub use providers::ProvidersConfig;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};
pub use telemetry::TelemetryConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a gateway in
/// front of the public provider endpoints with 5 concurrent / 60 per minute
/// per key and credit enforcement off.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, environment, upstream timeout)
    #[serde(default)]
    pub server: ServerConfig,

    /// Admission defaults and static per-key overrides
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Upstream provider base addresses
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Redis store for per-key overrides (optional)
    #[serde(default)]
    pub redis: Option<RedisConfig>,

    /// Alert webhook sink
    #[serde(default)]
    pub alerts: AlertsConfig,

    /// Logging and tracing
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `LLM_GATEWAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `LLM_GATEWAY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `LLM_GATEWAY__LIMITS__CREDIT_LIMIT=25` -> `limits.credit_limit = 25.0`
    /// - `LLM_GATEWAY__REDIS__URL=...` -> `redis.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LLM_GATEWAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.limits.validate()?;
        self.providers.validate()?;
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        self.alerts.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    /// Telemetry settings with environment policy applied
    ///
    /// Production always logs JSON, whatever `json_logs` says.
    pub fn telemetry(&self) -> TelemetryConfig {
        let mut telemetry = self.telemetry.clone();
        if self.is_production() {
            telemetry.json_logs = true;
        }
        telemetry
    }
}
