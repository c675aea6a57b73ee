//! RequestTracer port - optional instrumentation around each request.
//!
//! Spans created by a tracer declare the fields `key`, `provider` and
//! `status` as empty; the request lifecycle fills them in through
//! `Span::current().record(..)`. Recording on a disabled span is a no-op,
//! so callers never branch on whether tracing is active.

use std::future::Future;

use tracing::{Instrument, Span};

/// Port for creating request spans.
pub trait RequestTracer: Send + Sync {
    /// Creates the span for one unit of work named `name`.
    fn span(&self, name: &'static str) -> Span;
}

/// Runs `body` inside a span from `tracer`.
///
/// With a no-op tracer this is a plain `.await` of `body`.
pub async fn with_span<F>(tracer: &dyn RequestTracer, name: &'static str, body: F) -> F::Output
where
    F: Future,
{
    body.instrument(tracer.span(name)).await
}
