//! Axum router configuration for the gateway.

use std::sync::Arc;

use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{metrics, proxy};
use crate::application::Gateway;

/// Create the gateway router.
///
/// # Routes
///
/// - `ANY /metrics` - latency exposition, bypasses all limiting
/// - everything else - proxied to the selected provider
pub fn gateway_router(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .route("/metrics", any(metrics))
        .fallback(proxy)
        .layer(TraceLayer::new_for_http())
        .with_state(gateway)
}
