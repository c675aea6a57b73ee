//! The per-request lifecycle.
//!
//! Credential → quota → concurrency → rate → credit pre-check → provider →
//! forward → cost and metrics. The concurrency slot is an RAII guard held on
//! the stack of `process`, so every exit path (rejection, transport error,
//! dropped future) releases it exactly once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::HeaderMap;
use axum::response::Response;
use tracing::{Instrument, Span};

use crate::adapters::proxy::{ForwardError, ProxyForwarder, PROVIDER_HEADER};
use crate::application::LimitResolver;
use crate::domain::admission::{
    ConcurrencyCounter, CreditAlert, CreditCheck, CreditLedger, RateDecision, RateLimiter,
};
use crate::domain::foundation::{ApiKey, CreditCeiling, ErrorCode};
use crate::domain::metrics::MetricsRegistry;
use crate::domain::routing::ProviderRouter;
use crate::ports::{with_span, AlertNotifier, RequestTracer};

/// Provider used when the request names none.
pub const DEFAULT_PROVIDER: &str = "openai";

// ════════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════════

/// Responses the gateway produces itself instead of proxying.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Missing API key")]
    MissingCredential,

    #[error("Concurrency limit exceeded")]
    ConcurrencyExceeded,

    #[error("Rate limit exceeded")]
    RateExceeded { retry_after: Duration },

    #[error("Credit limit exceeded")]
    CreditExceeded,

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error(transparent)]
    Upstream(#[from] ForwardError),
}

impl GatewayError {
    /// Stable machine-readable code for the error body.
    pub fn code(&self) -> ErrorCode {
        match self {
            GatewayError::MissingCredential => ErrorCode::MissingCredential,
            GatewayError::ConcurrencyExceeded => ErrorCode::ConcurrencyLimitExceeded,
            GatewayError::RateExceeded { .. } => ErrorCode::RateLimitExceeded,
            GatewayError::CreditExceeded => ErrorCode::CreditLimitExceeded,
            GatewayError::UnknownProvider(_) => ErrorCode::UnknownProvider,
            GatewayError::Upstream(ForwardError::Timeout) => ErrorCode::UpstreamTimeout,
            GatewayError::Upstream(ForwardError::BodyTooLarge { .. }) => {
                ErrorCode::RequestBodyTooLarge
            }
            GatewayError::Upstream(_) => ErrorCode::UpstreamUnavailable,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Gateway
// ════════════════════════════════════════════════════════════════════════════════

/// Admission state and collaborators shared by every request.
pub struct Gateway {
    resolver: LimitResolver,
    concurrency: Arc<ConcurrencyCounter>,
    rate: RateLimiter,
    credit: CreditLedger,
    ceiling: CreditCeiling,
    router: ProviderRouter,
    default_provider: String,
    forwarder: ProxyForwarder,
    metrics: Arc<MetricsRegistry>,
    notifier: Arc<dyn AlertNotifier>,
    tracer: Arc<dyn RequestTracer>,
}

impl Gateway {
    /// Creates a gateway with credit enforcement disabled and `openai` as
    /// the default provider.
    pub fn new(
        resolver: LimitResolver,
        router: ProviderRouter,
        forwarder: ProxyForwarder,
        notifier: Arc<dyn AlertNotifier>,
        tracer: Arc<dyn RequestTracer>,
    ) -> Self {
        Self {
            resolver,
            concurrency: Arc::new(ConcurrencyCounter::new()),
            rate: RateLimiter::new(),
            credit: CreditLedger::new(),
            ceiling: CreditCeiling::Disabled,
            router,
            default_provider: DEFAULT_PROVIDER.to_string(),
            forwarder,
            metrics: Arc::new(MetricsRegistry::new()),
            notifier,
            tracer,
        }
    }

    /// Sets the per-key credit ceiling.
    pub fn with_credit_ceiling(mut self, ceiling: CreditCeiling) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Sets the provider used when `X-LLM-Provider` is absent or empty.
    pub fn with_default_provider(mut self, provider: impl Into<String>) -> Self {
        self.default_provider = provider.into().to_ascii_lowercase();
        self
    }

    /// Shares an existing metrics registry.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Runs one proxied request through admission and forwarding.
    pub async fn handle(&self, request: Request) -> Result<Response, GatewayError> {
        let result = with_span(self.tracer.as_ref(), "proxy", self.process(request)).await;
        if let Err(e) = &result {
            tracing::debug!(code = %e.code(), "Request rejected: {}", e);
        }
        result
    }

    async fn process(&self, request: Request) -> Result<Response, GatewayError> {
        let span = Span::current();

        let key = credential(request.headers()).ok_or(GatewayError::MissingCredential)?;
        span.record("key", key.fingerprint().as_str());

        let quota = self.resolver.resolve(&key).await;

        let _slot = self
            .concurrency
            .try_acquire(&key, quota.concurrency)
            .ok_or(GatewayError::ConcurrencyExceeded)?;

        if let RateDecision::Denied { retry_after } = self.rate.check(&key, quota.rate) {
            return Err(GatewayError::RateExceeded { retry_after });
        }

        if let CreditCheck::Exceeded(alert) = self.credit.check(&key, self.ceiling) {
            self.dispatch_alert(alert);
            return Err(GatewayError::CreditExceeded);
        }

        let provider = self.provider_name(request.headers());
        span.record("provider", provider.as_str());
        let base = self
            .router
            .route(&provider)
            .ok_or_else(|| GatewayError::UnknownProvider(provider.clone()))?;

        let forwarded = self.forwarder.forward(request, base).await.map_err(|e| {
            tracing::warn!(provider = %provider, "Upstream request failed: {}", e);
            GatewayError::from(e)
        })?;

        self.metrics.record(&provider, forwarded.latency_ms);
        if let Some(alert) = self.credit.record_cost(&key, forwarded.cost, self.ceiling) {
            self.dispatch_alert(alert);
        }

        span.record("status", forwarded.response.status().as_u16());
        Ok(forwarded.response)
    }

    fn provider_name(&self, headers: &HeaderMap) -> String {
        headers
            .get(PROVIDER_HEADER)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_ascii_lowercase())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.default_provider.clone())
    }

    fn dispatch_alert(&self, alert: CreditAlert) {
        tracing::warn!(key = %alert.key_fingerprint, "{}", alert);
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(
            async move {
                if let Err(e) = notifier.notify(&alert).await {
                    tracing::warn!(key = %alert.key_fingerprint, "Alert delivery failed: {}", e);
                }
            }
            .in_current_span(),
        );
    }

    /// Requests currently admitted for `key`.
    pub fn in_flight(&self, key: &ApiKey) -> u32 {
        self.concurrency.in_flight(key)
    }

    /// Cumulative recorded cost for `key`.
    pub fn spent(&self, key: &ApiKey) -> f64 {
        self.credit.spent(key)
    }

    /// The latency registry behind `/metrics`.
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Evicts rate buckets idle for at least one window.
    pub fn prune_idle(&self, now: Instant) -> usize {
        self.rate.prune_idle(now)
    }
}

/// The `Authorization` value as a key. Absent or blank means no credential.
fn credential(headers: &HeaderMap) -> Option<ApiKey> {
    let raw = headers.get(axum::http::header::AUTHORIZATION)?.as_bytes();
    if raw.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    ApiKey::from_bytes(raw).ok()
}
