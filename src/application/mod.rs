//! Application layer - the request lifecycle.
//!
//! Coordinates the synchronous admission state machines in `domain` with the
//! optional collaborators behind `ports` and the upstream forwarder.

mod gateway;
mod limit_resolver;

pub use gateway::{Gateway, GatewayError, DEFAULT_PROVIDER};
pub use limit_resolver::LimitResolver;
