//! Admission control state machines.
//!
//! All three components are synchronous and hold their per-key maps behind
//! a mutex. No lock is held across an await point, so each
//! check-then-mutate step is atomic even on a multi-threaded runtime.
//!
//! - `ConcurrencyCounter` - in-flight requests per key
//! - `RateLimiter` - continuous token bucket per key
//! - `CreditLedger` - cumulative spend and one-shot alerts per key

mod concurrency;
mod credit_ledger;
mod token_bucket;

pub use concurrency::{ConcurrencyCounter, ConcurrencySlot};
pub use credit_ledger::{CreditAlert, CreditAlertKind, CreditCheck, CreditLedger};
pub use token_bucket::{RateDecision, RateLimiter, RATE_WINDOW};
