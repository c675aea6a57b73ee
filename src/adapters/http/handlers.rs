//! HTTP handlers for the gateway.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::application::Gateway;
use crate::domain::metrics::METRICS_CONTENT_TYPE;

use super::error::GatewayApiError;

/// ANY /metrics - accumulated latency per provider.
///
/// Never touches admission state.
pub async fn metrics(State(gateway): State<Arc<Gateway>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        gateway.metrics().render(),
    )
}

/// Every other path - admission, then forwarding.
pub async fn proxy(
    State(gateway): State<Arc<Gateway>>,
    request: Request,
) -> Result<Response, GatewayApiError> {
    Ok(gateway.handle(request).await?)
}
