//! Limit store port for per-key quota overrides.
//!
//! This port defines the interface for looking up a key's concurrency and
//! rate overrides in an external key-value store. Implementations can use
//! in-memory storage for testing or Redis for production.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ApiKey, Quota};

/// Port for per-key limit overrides.
///
/// Implementations should be thread-safe and support concurrent access.
/// A store that cannot be reached returns `Unavailable`; the resolver
/// treats that exactly like "no override".
#[async_trait]
pub trait LimitStore: Send + Sync {
    /// Looks up the override for `key`, if one is stored.
    async fn lookup(&self, key: &ApiKey) -> Result<Option<LimitOverride>, LimitStoreError>;
}

/// Stored override document. Either field may be absent.
///
/// A field value of `0` means "unlimited".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOverride {
    /// Maximum simultaneous in-flight requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<u32>,
    /// Requests per rate window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<u32>,
}

impl LimitOverride {
    /// Creates an override with both fields set.
    pub fn new(concurrency: u32, rate: u32) -> Self {
        Self {
            concurrency: Some(concurrency),
            rate: Some(rate),
        }
    }

    /// Fills absent fields from `defaults` (raw values, `0` = unlimited).
    pub fn resolve(&self, default_concurrency: u32, default_rate: u32) -> Quota {
        Quota::from_raw(
            self.concurrency.unwrap_or(default_concurrency),
            self.rate.unwrap_or(default_rate),
        )
    }
}

/// Errors that can occur during limit store operations.
#[derive(Debug, thiserror::Error)]
pub enum LimitStoreError {
    /// Store backend is unavailable.
    #[error("limit store unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be decoded.
    #[error("malformed limit override: {0}")]
    Malformed(String),
}
