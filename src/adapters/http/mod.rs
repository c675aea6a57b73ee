//! HTTP adapter - the inbound surface of the gateway.

mod error;
mod handlers;
mod routes;

pub use error::{retry_after_secs, GatewayApiError};
pub use routes::gateway_router;
