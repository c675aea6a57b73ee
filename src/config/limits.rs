//! Admission limit configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::CreditCeiling;

/// Global admission defaults and the static per-key override blob
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Cumulative spend ceiling per key (0 = disabled)
    #[serde(default)]
    pub credit_limit: f64,

    /// Default in-flight requests per key (0 = unlimited)
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: u32,

    /// Default requests per minute per key (0 = unlimited)
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,

    /// JSON object mapping raw keys to `{"concurrency": n, "rate": n}`
    pub key_limits_json: Option<String>,
}

impl LimitsConfig {
    /// The credit ceiling applied to every key
    pub fn credit_ceiling(&self) -> CreditCeiling {
        CreditCeiling::from_raw(self.credit_limit)
    }

    /// Validate limit configuration
    ///
    /// The override blob is deliberately not parsed here: a malformed blob
    /// degrades to "no overrides" at runtime instead of refusing to start.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.credit_limit.is_finite() {
            return Err(ValidationError::InvalidCreditLimit);
        }
        Ok(())
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            credit_limit: 0.0,
            concurrency_limit: default_concurrency_limit(),
            rate_limit: default_rate_limit(),
            key_limits_json: None,
        }
    }
}

fn default_concurrency_limit() -> u32 {
    5
}

fn default_rate_limit() -> u32 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_defaults() {
        let config = LimitsConfig::default();
        assert_eq!(config.concurrency_limit, 5);
        assert_eq!(config.rate_limit, 60);
        assert_eq!(config.credit_ceiling(), CreditCeiling::Disabled);
    }

    #[test]
    fn test_positive_credit_limit_enables_ceiling() {
        let config = LimitsConfig {
            credit_limit: 25.5,
            ..Default::default()
        };
        assert_eq!(config.credit_ceiling(), CreditCeiling::Ceiling(25.5));
    }

    #[test]
    fn test_validation_rejects_nan_credit_limit() {
        let config = LimitsConfig {
            credit_limit: f64::NAN,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidCreditLimit));
    }

    #[test]
    fn test_malformed_override_blob_still_validates() {
        let config = LimitsConfig {
            key_limits_json: Some("{not json".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
