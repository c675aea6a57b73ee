//! Continuous-refill token bucket, one bucket per key.
//!
//! Each call converts the time elapsed since the bucket's last refill into
//! fractional tokens at `rate` tokens per [`RATE_WINDOW`], capped at a
//! capacity of `rate`. A request is admitted by debiting one whole token.
//! Fractional tokens carry over between calls, so there is no burst at
//! window boundaries.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::domain::foundation::{ApiKey, Limit};

/// Refill period: a bucket of capacity `rate` refills completely in one window.
pub const RATE_WINDOW: Duration = Duration::from_millis(60_000);

/// Outcome of a rate check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateDecision {
    /// One token was debited (or the key is unlimited).
    Allowed,
    /// Less than one token is available; nothing was debited.
    Denied {
        /// Time until one full token will have accumulated.
        retry_after: Duration,
    },
}

impl RateDecision {
    /// Returns true if the request was admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed)
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }

    fn refill(&mut self, capacity: f64, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        let credit = elapsed.as_secs_f64() * capacity / RATE_WINDOW.as_secs_f64();
        self.tokens = (self.tokens + credit).min(capacity);
        if now > self.last_refill {
            self.last_refill = now;
        }
    }
}

/// Per-key token buckets.
#[derive(Debug, Default)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<ApiKey, Bucket>>,
}

impl RateLimiter {
    /// Creates a limiter with no buckets.
    pub fn new() -> Self {
        Self::default()
    }

    fn buckets(&self) -> MutexGuard<'_, HashMap<ApiKey, Bucket>> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admits or rejects a request for `key` at the current instant.
    pub fn allow(&self, key: &ApiKey, rate: Limit) -> bool {
        self.check_at(key, rate, Instant::now()).is_allowed()
    }

    /// Admits or rejects a request for `key` at the current instant.
    pub fn check(&self, key: &ApiKey, rate: Limit) -> RateDecision {
        self.check_at(key, rate, Instant::now())
    }

    /// Admits or rejects a request for `key` as of `now`.
    ///
    /// Unlimited keys are admitted without creating or touching a bucket.
    pub fn check_at(&self, key: &ApiKey, rate: Limit, now: Instant) -> RateDecision {
        let Some(rate) = rate.max() else {
            return RateDecision::Allowed;
        };
        let capacity = f64::from(rate);

        let mut buckets = self.buckets();
        let bucket = buckets
            .entry(key.clone())
            .or_insert_with(|| Bucket::full(capacity, now));
        bucket.refill(capacity, now);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            RateDecision::Allowed
        } else {
            let missing = 1.0 - bucket.tokens;
            let secs = missing * RATE_WINDOW.as_secs_f64() / capacity;
            RateDecision::Denied {
                retry_after: Duration::from_secs_f64(secs),
            }
        }
    }

    /// Tokens currently stored for `key`, without refilling.
    ///
    /// Returns `None` if the key has no bucket yet.
    pub fn available_tokens(&self, key: &ApiKey) -> Option<f64> {
        self.buckets().get(key).map(|bucket| bucket.tokens)
    }

    /// Evicts buckets idle for at least one full window.
    ///
    /// Such a bucket would have refilled to capacity, which is exactly the
    /// state a lazily created bucket starts in. Returns the number evicted.
    pub fn prune_idle(&self, now: Instant) -> usize {
        let mut buckets = self.buckets();
        let before = buckets.len();
        buckets.retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < RATE_WINDOW);
        before - buckets.len()
    }

    /// Number of keys with a bucket.
    pub fn tracked_keys(&self) -> usize {
        self.buckets().len()
    }
}
