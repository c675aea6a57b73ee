//! Upstream forwarding.

mod forwarder;

pub use forwarder::{
    parse_cost, target_url, ForwardError, DEFAULT_BODY_LIMIT, ForwardedResponse, ProxyForwarder, PROVIDER_HEADER,
    USAGE_COST_HEADER,
};
