//! Alert sink configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::providers::is_http_url;

/// Webhook alert configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AlertsConfig {
    /// Webhook receiving `{"text": ...}` alert payloads; alerts are off when unset
    pub webhook_url: Option<String>,

    /// Delivery timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AlertsConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured sink, ignoring empty values
    pub fn sink(&self) -> Option<&str> {
        self.webhook_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Validate alert configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = self.sink() {
            if !is_http_url(url) {
                return Err(ValidationError::InvalidWebhookUrl);
            }
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("alerts"));
        }
        Ok(())
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}
