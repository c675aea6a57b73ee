//! Composition root.
//!
//! Picks the real or no-op implementation of each optional capability and
//! assembles the `Gateway`. Auxiliary backends that cannot be constructed
//! are logged and replaced by their no-op counterpart; only a forwarder
//! that cannot be built is fatal.

use std::sync::Arc;

use crate::adapters::alerts::{NoopNotifier, WebhookNotifier};
use crate::adapters::limit_store::{NoopLimitStore, RedisLimitStore};
use crate::adapters::proxy::{ForwardError, ProxyForwarder};
use crate::application::{Gateway, LimitResolver};
use crate::config::{AlertsConfig, AppConfig, RedisConfig};
use crate::ports::{AlertNotifier, LimitStore, RequestTracer};

/// Builds the gateway described by `config`.
pub async fn build_gateway(
    config: &AppConfig,
    tracer: Arc<dyn RequestTracer>,
) -> Result<Gateway, ForwardError> {
    let store = limit_store(config.redis.as_ref()).await;
    let notifier = alert_notifier(&config.alerts);
    let forwarder = ProxyForwarder::new(config.server.upstream_timeout())?
        .with_body_limit(config.server.max_request_body_bytes);

    Ok(Gateway::new(
        LimitResolver::new(&config.limits, store),
        config.providers.router(),
        forwarder,
        notifier,
        tracer,
    )
    .with_credit_ceiling(config.limits.credit_ceiling())
    .with_default_provider(config.providers.default_provider.clone()))
}

async fn limit_store(config: Option<&RedisConfig>) -> Arc<dyn LimitStore> {
    let Some(config) = config.filter(|c| !c.url.is_empty()) else {
        return Arc::new(NoopLimitStore);
    };
    match RedisLimitStore::connect(config).await {
        Ok(store) => {
            tracing::info!(prefix = %config.key_prefix, "Using Redis limit overrides");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!("Redis limit store unavailable, overrides disabled: {}", e);
            Arc::new(NoopLimitStore)
        }
    }
}

fn alert_notifier(config: &AlertsConfig) -> Arc<dyn AlertNotifier> {
    let Some(url) = config.sink() else {
        return Arc::new(NoopNotifier);
    };
    match WebhookNotifier::new(url, config.timeout()) {
        Ok(notifier) => Arc::new(notifier),
        Err(e) => {
            tracing::warn!("Alert webhook unavailable, alerts disabled: {}", e);
            Arc::new(NoopNotifier)
        }
    }
}
