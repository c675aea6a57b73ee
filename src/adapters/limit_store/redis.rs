//! Redis-backed limit store for production deployments.
//!
//! Each override is a JSON document (`{"concurrency": n, "rate": n}`) stored
//! as a plain string under `<prefix><raw key bytes>`. Every lookup is bounded by
//! the configured timeout so a slow Redis cannot stall admission.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::config::RedisConfig;
use crate::domain::foundation::ApiKey;
use crate::ports::{LimitOverride, LimitStore, LimitStoreError};

/// Redis-backed per-key overrides.
#[derive(Clone)]
pub struct RedisLimitStore {
    conn: MultiplexedConnection,
    key_prefix: String,
    timeout: Duration,
}

impl RedisLimitStore {
    /// Wraps an existing connection.
    pub fn new(conn: MultiplexedConnection, key_prefix: impl Into<String>, timeout: Duration) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
            timeout,
        }
    }

    /// Opens a multiplexed connection using `config`.
    pub async fn connect(config: &RedisConfig) -> Result<Self, LimitStoreError> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| LimitStoreError::Unavailable(e.to_string()))?;

        let conn = tokio::time::timeout(config.timeout(), client.get_multiplexed_tokio_connection())
            .await
            .map_err(|_| LimitStoreError::Unavailable("connection timed out".to_string()))?
            .map_err(|e: redis::RedisError| LimitStoreError::Unavailable(e.to_string()))?;

        Ok(Self::new(conn, config.key_prefix.clone(), config.timeout()))
    }

    /// Returns the Redis key holding the override for `key`.
    pub fn storage_key(&self, key: &ApiKey) -> Vec<u8> {
        storage_key(&self.key_prefix, key)
    }
}

fn storage_key(prefix: &str, key: &ApiKey) -> Vec<u8> {
    let mut out = Vec::with_capacity(prefix.len() + key.as_bytes().len());
    out.extend_from_slice(prefix.as_bytes());
    out.extend_from_slice(key.as_bytes());
    out
}

fn decode(raw: &str) -> Result<LimitOverride, LimitStoreError> {
    serde_json::from_str(raw).map_err(|e| LimitStoreError::Malformed(e.to_string()))
}

#[async_trait]
impl LimitStore for RedisLimitStore {
    async fn lookup(&self, key: &ApiKey) -> Result<Option<LimitOverride>, LimitStoreError> {
        let redis_key = self.storage_key(key);
        let mut conn = self.conn.clone();

        let raw: Option<String> = tokio::time::timeout(self.timeout, conn.get(&redis_key))
            .await
            .map_err(|_| LimitStoreError::Unavailable("lookup timed out".to_string()))?
            .map_err(|e: redis::RedisError| LimitStoreError::Unavailable(e.to_string()))?;

        raw.as_deref().map(decode).transpose()
    }
}

impl std::fmt::Debug for RedisLimitStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisLimitStore")
            .field("key_prefix", &self.key_prefix)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
