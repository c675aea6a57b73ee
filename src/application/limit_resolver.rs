//! Resolves the admission quota for a key.
//!
//! Sources are consulted in order and the first match wins:
//! 1. the static JSON override map from configuration
//! 2. the external limit store
//! 3. the global defaults
//!
//! Within a matching override, each absent field falls back to its default
//! independently. Failures in either override source are logged and treated
//! as "no override". A static entry with the wrong shape is skipped on its
//! own; the remaining entries still apply.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::LimitsConfig;
use crate::domain::foundation::{ApiKey, Quota};
use crate::ports::{LimitOverride, LimitStore};

/// Quota resolution for incoming keys.
pub struct LimitResolver {
    default_concurrency: u32,
    default_rate: u32,
    static_json: Option<String>,
    static_overrides: OnceCell<HashMap<String, LimitOverride>>,
    store: Arc<dyn LimitStore>,
}

impl LimitResolver {
    /// Creates a resolver from the limits configuration and a store.
    pub fn new(config: &LimitsConfig, store: Arc<dyn LimitStore>) -> Self {
        Self {
            default_concurrency: config.concurrency_limit,
            default_rate: config.rate_limit,
            static_json: config.key_limits_json.clone(),
            static_overrides: OnceCell::new(),
            store,
        }
    }

    /// Resolves the quota for `key`.
    ///
    /// The store lookup is the only await point.
    pub async fn resolve(&self, key: &ApiKey) -> Quota {
        let static_match = key.as_str().and_then(|raw| self.static_overrides().get(raw));
        if let Some(found) = static_match {
            return found.resolve(self.default_concurrency, self.default_rate);
        }

        match self.store.lookup(key).await {
            Ok(Some(found)) => return found.resolve(self.default_concurrency, self.default_rate),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key = %key, "Limit store lookup failed, using defaults: {}", e);
            }
        }

        self.default_quota()
    }

    /// The quota applied when no override matches.
    pub fn default_quota(&self) -> Quota {
        Quota::from_raw(self.default_concurrency, self.default_rate)
    }

    /// The static override map, parsed on first use.
    pub fn static_overrides(&self) -> &HashMap<String, LimitOverride> {
        self.static_overrides
            .get_or_init(|| parse_overrides(self.static_json.as_deref()))
    }
}

fn parse_overrides(raw: Option<&str>) -> HashMap<String, LimitOverride> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return HashMap::new();
    };
    let entries: HashMap<String, serde_json::Value> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Ignoring malformed key limit overrides: {}", e);
            return HashMap::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<LimitOverride>(value) {
            Ok(found) => Some((key, found)),
            Err(e) => {
                let fingerprint = ApiKey::new(key).map(|k| k.fingerprint()).unwrap_or_default();
                tracing::warn!(key = %fingerprint, "Skipping malformed key limit override: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::limit_store::{InMemoryLimitStore, NoopLimitStore};
    use crate::domain::foundation::Limit;
    use crate::ports::LimitStoreError;
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl LimitStore for FailingStore {
        async fn lookup(&self, _key: &ApiKey) -> Result<Option<LimitOverride>, LimitStoreError> {
            Err(LimitStoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn key(raw: &str) -> ApiKey {
        ApiKey::new(raw).unwrap()
    }

    fn config(json: Option<&str>) -> LimitsConfig {
        LimitsConfig {
            concurrency_limit: 5,
            rate_limit: 60,
            key_limits_json: json.map(str::to_string),
            ..Default::default()
        }
    }

    // ─── Resolution Order ─────────────────────────────────────────────

    #[tokio::test]
    async fn falls_back_to_defaults() {
        let resolver = LimitResolver::new(&config(None), Arc::new(NoopLimitStore));
        let quota = resolver.resolve(&key("sk-1")).await;
        assert_eq!(quota, Quota::from_raw(5, 60));
    }

    #[tokio::test]
    async fn static_override_wins_over_store() {
        let store = InMemoryLimitStore::new();
        store.set(&key("sk-1"), LimitOverride::new(1, 1)).await;
        let resolver = LimitResolver::new(
            &config(Some(r#"{"sk-1": {"concurrency": 9, "rate": 90}}"#)),
            Arc::new(store),
        );

        let quota = resolver.resolve(&key("sk-1")).await;
        assert_eq!(quota, Quota::from_raw(9, 90));
    }

    #[tokio::test]
    async fn store_override_used_when_not_in_static_map() {
        let store = InMemoryLimitStore::new();
        store.set(&key("sk-2"), LimitOverride::new(2, 20)).await;
        let resolver = LimitResolver::new(
            &config(Some(r#"{"sk-1": {"rate": 90}}"#)),
            Arc::new(store),
        );

        let quota = resolver.resolve(&key("sk-2")).await;
        assert_eq!(quota, Quota::from_raw(2, 20));
    }

    #[tokio::test]
    async fn partial_override_fills_from_defaults() {
        let resolver = LimitResolver::new(
            &config(Some(r#"{"sk-1": {"rate": 7}}"#)),
            Arc::new(NoopLimitStore),
        );

        let quota = resolver.resolve(&key("sk-1")).await;
        assert_eq!(quota.concurrency.max(), Some(5));
        assert_eq!(quota.rate.max(), Some(7));
    }

    #[tokio::test]
    async fn zero_override_means_unlimited() {
        let resolver = LimitResolver::new(
            &config(Some(r#"{"sk-1": {"concurrency": 0, "rate": 0}}"#)),
            Arc::new(NoopLimitStore),
        );

        let quota = resolver.resolve(&key("sk-1")).await;
        assert_eq!(quota.concurrency, Limit::Unlimited);
        assert_eq!(quota.rate, Limit::Unlimited);
    }

    #[tokio::test]
    async fn zero_defaults_mean_unlimited() {
        let resolver = LimitResolver::new(
            &LimitsConfig {
                concurrency_limit: 0,
                rate_limit: 0,
                ..Default::default()
            },
            Arc::new(NoopLimitStore),
        );

        let quota = resolver.resolve(&key("sk-1")).await;
        assert_eq!(quota, resolver.default_quota());
        assert_eq!(quota.concurrency, Limit::Unlimited);
        assert_eq!(quota.rate, Limit::Unlimited);
    }

    // ─── Degradation ──────────────────────────────────────────────────

    #[tokio::test]
    async fn malformed_static_json_is_treated_as_empty() {
        let resolver = LimitResolver::new(&config(Some("{not json")), Arc::new(NoopLimitStore));

        assert!(resolver.static_overrides().is_empty());
        let quota = resolver.resolve(&key("sk-1")).await;
        assert_eq!(quota, resolver.default_quota());
    }

    #[tokio::test]
    async fn bad_static_entries_do_not_drop_good_ones() {
        let resolver = LimitResolver::new(
            &config(Some(
                r#"{"k1": {"rate": 1}, "k2": null, "k3": {"rate": -1}, "k4": {"rate": 1.5}, "k5": "fast"}"#,
            )),
            Arc::new(NoopLimitStore),
        );

        assert_eq!(resolver.static_overrides().len(), 1);
        assert_eq!(resolver.resolve(&key("k1")).await, Quota::from_raw(5, 1));
        assert_eq!(resolver.resolve(&key("k2")).await, Quota::from_raw(5, 60));
        assert_eq!(resolver.resolve(&key("k4")).await, Quota::from_raw(5, 60));
    }

    #[tokio::test]
    async fn non_utf8_key_skips_static_map() {
        let store = InMemoryLimitStore::new();
        let raw = ApiKey::from_bytes(&b"k1\xff"[..]).unwrap();
        store.set(&raw, LimitOverride::new(2, 2)).await;
        let resolver = LimitResolver::new(
            &config(Some(r#"{"k1": {"rate": 1}}"#)),
            Arc::new(store),
        );

        assert_eq!(resolver.resolve(&raw).await, Quota::from_raw(2, 2));
    }

    #[tokio::test]
    async fn unreachable_store_is_treated_as_no_override() {
        let resolver = LimitResolver::new(&config(None), Arc::new(FailingStore));
        let quota = resolver.resolve(&key("sk-1")).await;
        assert_eq!(quota, Quota::from_raw(5, 60));
    }

    #[test]
    fn static_map_is_parsed_once_and_cached() {
        let resolver = LimitResolver::new(
            &config(Some(r#"{"a": {"rate": 1}, "b": {"concurrency": 2}}"#)),
            Arc::new(NoopLimitStore),
        );

        let first = resolver.static_overrides() as *const _;
        let second = resolver.static_overrides() as *const _;
        assert_eq!(first, second);
        assert_eq!(resolver.static_overrides().len(), 2);
    }

    #[test]
    fn blank_static_json_is_empty() {
        assert!(parse_overrides(Some("   ")).is_empty());
        assert!(parse_overrides(None).is_empty());
    }
}
