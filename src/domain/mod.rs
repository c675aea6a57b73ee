//! Domain layer - gateway state and rules, free of I/O.
//!
//! - `foundation` - keys, quotas, credit ceiling, error codes
//! - `admission` - concurrency counter, token bucket, credit ledger
//! - `routing` - provider name to upstream base address
//! - `metrics` - per-provider latency counters

pub mod admission;
pub mod foundation;
pub mod metrics;
pub mod routing;
