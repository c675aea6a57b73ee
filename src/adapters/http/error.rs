//! HTTP mapping for responses the gateway emits itself.

use std::time::Duration;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::adapters::proxy::ForwardError;
use crate::application::GatewayError;

/// API error type that converts gateway rejections to HTTP responses.
#[derive(Debug)]
pub struct GatewayApiError(GatewayError);

impl From<GatewayError> for GatewayApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl GatewayApiError {
    /// Status code for the wrapped error.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GatewayError::MissingCredential => StatusCode::UNAUTHORIZED,
            GatewayError::ConcurrencyExceeded
            | GatewayError::RateExceeded { .. }
            | GatewayError::CreditExceeded => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::UnknownProvider(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream(ForwardError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Upstream(ForwardError::BodyTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.0.code();

        let GatewayError::RateExceeded { retry_after } = &self.0 else {
            let body = serde_json::json!({
                "error": self.0.to_string(),
                "code": code.as_str(),
            });
            return (status, Json(body)).into_response();
        };

        let retry_after_secs = retry_after_secs(*retry_after);
        let mut response = (
            status,
            Json(serde_json::json!({
                "error": self.0.to_string(),
                "code": code.as_str(),
                "retry_after_secs": retry_after_secs,
            })),
        )
            .into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        response
    }
}

/// Whole seconds until a retry can succeed, rounded up, at least 1.
pub fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}
