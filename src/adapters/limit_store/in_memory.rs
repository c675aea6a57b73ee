//! In-memory limit store for testing and development.
//!
//! Not shared between gateway instances.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::ApiKey;
use crate::ports::{LimitOverride, LimitStore, LimitStoreError};

/// In-memory per-key overrides.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLimitStore {
    overrides: Arc<RwLock<HashMap<ApiKey, LimitOverride>>>,
}

impl InMemoryLimitStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an override for `key`, replacing any previous one.
    pub async fn set(&self, key: &ApiKey, value: LimitOverride) {
        let mut overrides = self.overrides.write().await;
        overrides.insert(key.clone(), value);
    }

    /// Removes the override for `key`.
    pub async fn remove(&self, key: &ApiKey) {
        let mut overrides = self.overrides.write().await;
        overrides.remove(key);
    }
}

#[async_trait]
impl LimitStore for InMemoryLimitStore {
    async fn lookup(&self, key: &ApiKey) -> Result<Option<LimitOverride>, LimitStoreError> {
        let overrides = self.overrides.read().await;
        Ok(overrides.get(key).copied())
    }
}
