//! Limit store adapters.
//!
//! Implementations of the LimitStore port for different backends.
//!
//! ## Available Adapters
//!
//! - `RedisLimitStore` - Redis-backed for production
//! - `InMemoryLimitStore` - In-memory for testing and development
//! - `NoopLimitStore` - No external store; every lookup misses
//!
//! ## Usage
//!
//! ```ignore
//! use llm_gateway::adapters::limit_store::{NoopLimitStore, RedisLimitStore};
//!
//! let store: Arc<dyn LimitStore> = match RedisLimitStore::connect(&redis_config).await {
//!     Ok(store) => Arc::new(store),
//!     Err(_) => Arc::new(NoopLimitStore),
//! };
//! ```

mod in_memory;
mod redis;

pub use in_memory::InMemoryLimitStore;
pub use redis::RedisLimitStore;

use async_trait::async_trait;

use crate::domain::foundation::ApiKey;
use crate::ports::{LimitOverride, LimitStore, LimitStoreError};

/// Limit store used when no external store is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLimitStore;

#[async_trait]
impl LimitStore for NoopLimitStore {
    async fn lookup(&self, _key: &ApiKey) -> Result<Option<LimitOverride>, LimitStoreError> {
        Ok(None)
    }
}
