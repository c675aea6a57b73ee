//! Logging and request tracing.
//!
//! `init` installs the global `tracing-subscriber` registry and picks the
//! request tracer. A subscriber that cannot be installed (one is already
//! set, or the filter directive is invalid) degrades to `NoopTracer`.

use std::sync::Arc;

use tracing::field::Empty;
use tracing::Span;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::TelemetryConfig;
use crate::ports::RequestTracer;

/// Emits an `info` span per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanTracer;

impl RequestTracer for SpanTracer {
    fn span(&self, name: &'static str) -> Span {
        tracing::info_span!(
            "gateway.request",
            operation = name,
            key = Empty,
            provider = Empty,
            status = Empty,
        )
    }
}

/// Tracer that creates disabled spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl RequestTracer for NoopTracer {
    fn span(&self, _name: &'static str) -> Span {
        Span::none()
    }
}

/// Installs logging and returns the request tracer to use.
///
/// `RUST_LOG` takes precedence over `config.log_level`.
pub fn init(config: &TelemetryConfig) -> Arc<dyn RequestTracer> {
    match install_subscriber(config) {
        Ok(()) if config.enabled => Arc::new(SpanTracer),
        Ok(()) => Arc::new(NoopTracer),
        Err(e) => {
            // No subscriber of ours is active, so this may go nowhere.
            eprintln!("tracing disabled: {}", e);
            Arc::new(NoopTracer)
        }
    }
}

/// Picks the tracer for `config` without touching the global subscriber.
pub fn tracer_for(config: &TelemetryConfig) -> Arc<dyn RequestTracer> {
    if config.enabled {
        Arc::new(SpanTracer)
    } else {
        Arc::new(NoopTracer)
    }
}

fn install_subscriber(config: &TelemetryConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_tracer_spans_are_disabled() {
        let span = NoopTracer.span("proxy");
        assert!(span.is_disabled());
        // Recording on a disabled span is accepted silently.
        span.record("status", 200u16);
    }

    #[test]
    fn tracer_for_respects_enabled_flag() {
        let disabled = TelemetryConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(tracer_for(&disabled).span("proxy").is_disabled());
    }

    #[tokio::test]
    async fn with_span_returns_body_output() {
        let tracer = SpanTracer;
        let out = crate::ports::with_span(&tracer, "proxy", async { 41 + 1 }).await;
        assert_eq!(out, 42);
    }

    #[test]
    fn second_install_degrades_to_noop() {
        let config = TelemetryConfig::default();
        let _first = init(&config);
        // A global subscriber is now set (by this call or another test).
        let second = init(&config);
        assert!(second.span("proxy").is_disabled());
    }
}
