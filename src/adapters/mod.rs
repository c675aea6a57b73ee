//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the gateway to external systems:
//! - `alerts` - alert sinks (webhook, in-memory, no-op)
//! - `http` - axum router and error mapping
//! - `limit_store` - per-key override stores (Redis, in-memory, no-op)
//! - `observability` - tracing-subscriber setup and request tracers
//! - `proxy` - upstream forwarding over reqwest

pub mod alerts;
pub mod http;
pub mod limit_store;
pub mod observability;
pub mod proxy;

pub use http::gateway_router;
