//! Quota value objects.
//!
//! Raw configuration uses `0` to mean "unlimited". That sentinel is
//! translated exactly once, at the configuration boundary, into an explicit
//! [`Limit::Unlimited`]; nothing past that point compares against zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// An admission bound that is either absent or a positive count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limit {
    /// No bound is enforced.
    Unlimited,
    /// At most this many units are admitted.
    Max(NonZeroU32),
}

impl Limit {
    /// Converts a raw configured value, treating `0` as unlimited.
    pub fn from_raw(raw: u32) -> Self {
        match NonZeroU32::new(raw) {
            Some(n) => Limit::Max(n),
            None => Limit::Unlimited,
        }
    }

    /// Returns the bound, or `None` when unlimited.
    pub fn max(&self) -> Option<u32> {
        match self {
            Limit::Unlimited => None,
            Limit::Max(n) => Some(n.get()),
        }
    }

    /// Returns true if no bound is enforced.
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Limit::Unlimited)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Unlimited => f.write_str("unlimited"),
            Limit::Max(n) => write!(f, "{}", n),
        }
    }
}

/// The resolved admission quota for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    /// Maximum simultaneous in-flight requests.
    pub concurrency: Limit,
    /// Requests per rate window (token bucket capacity).
    pub rate: Limit,
}

impl Quota {
    /// Builds a quota from raw configured values.
    pub fn from_raw(concurrency: u32, rate: u32) -> Self {
        Self {
            concurrency: Limit::from_raw(concurrency),
            rate: Limit::from_raw(rate),
        }
    }

    /// A quota that enforces nothing.
    pub fn unlimited() -> Self {
        Self {
            concurrency: Limit::Unlimited,
            rate: Limit::Unlimited,
        }
    }
}

/// Cumulative spend ceiling applied to every key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CreditCeiling {
    /// Credit enforcement is off for all keys.
    Disabled,
    /// Keys whose spend reaches this value are blocked.
    Ceiling(f64),
}

impl CreditCeiling {
    /// Converts a raw configured value; anything `<= 0` or non-finite disables enforcement.
    pub fn from_raw(raw: f64) -> Self {
        if raw.is_finite() && raw > 0.0 {
            CreditCeiling::Ceiling(raw)
        } else {
            CreditCeiling::Disabled
        }
    }

    /// Returns true if `spent` is at or over the ceiling.
    pub fn is_reached(&self, spent: f64) -> bool {
        match self {
            CreditCeiling::Disabled => false,
            CreditCeiling::Ceiling(limit) => spent >= *limit,
        }
    }

    /// Returns true if enforcement is on.
    pub fn is_enabled(&self) -> bool {
        matches!(self, CreditCeiling::Ceiling(_))
    }
}
