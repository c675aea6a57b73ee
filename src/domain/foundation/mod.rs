//! Foundation module - Shared domain primitives.
//!
//! Contains the value objects and error types that form the vocabulary
//! of the gateway: caller keys, quotas, and the credit ceiling.

mod api_key;
mod errors;
mod limit;

pub use api_key::ApiKey;
pub use errors::{ErrorCode, ValidationError};
pub use limit::{CreditCeiling, Limit, Quota};
