//! Server configuration

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use super::error::ValidationError;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment name
    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// Upstream transport timeout in seconds (0 = wait for the transport)
    #[serde(default)]
    pub upstream_timeout_secs: u64,

    /// Interval between idle rate bucket sweeps, in seconds
    #[serde(default = "default_bucket_sweep")]
    pub bucket_sweep_secs: u64,

    /// Largest request body forwarded upstream, in bytes
    #[serde(default = "default_max_request_body")]
    pub max_request_body_bytes: usize,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|_| ValidationError::InvalidBindAddress(addr))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Upstream timeout, if one is configured
    pub fn upstream_timeout(&self) -> Option<Duration> {
        (self.upstream_timeout_secs > 0).then(|| Duration::from_secs(self.upstream_timeout_secs))
    }

    /// Interval between idle bucket sweeps
    pub fn bucket_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.bucket_sweep_secs)
    }

    /// Validate server configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.bucket_sweep_secs == 0 {
            return Err(ValidationError::InvalidTimeout("bucket_sweep_secs"));
        }
        if self.max_request_body_bytes == 0 {
            return Err(ValidationError::InvalidBodyLimit);
        }
        self.socket_addr()?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            upstream_timeout_secs: 0,
            bucket_sweep_secs: default_bucket_sweep(),
            max_request_body_bytes: default_max_request_body(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_bucket_sweep() -> u64 {
    60
}

fn default_max_request_body() -> usize {
    10 * 1024 * 1024
}
