//! Logging and tracing configuration

use serde::Deserialize;

/// Logging and request tracing settings
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Emit per-request spans
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Rust log filter directive, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON-formatted logs
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    "info,llm_gateway=debug,tower_http=info".to_string()
}
