//! Per-key in-flight request counter.
//!
//! Every admission must be matched by exactly one release. Callers should
//! prefer [`ConcurrencyCounter::try_acquire`], whose slot releases itself on
//! drop, over pairing [`ConcurrencyCounter::try_enter`] and
//! [`ConcurrencyCounter::exit`] by hand.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::foundation::{ApiKey, Limit};

/// Tracks how many requests each key currently has in flight.
///
/// Entries are removed as soon as a key's count drops back to zero, so the
/// map only ever holds keys with live requests.
#[derive(Debug, Default)]
pub struct ConcurrencyCounter {
    in_flight: Mutex<HashMap<ApiKey, u32>>,
}

impl ConcurrencyCounter {
    /// Creates an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    fn counts(&self) -> MutexGuard<'_, HashMap<ApiKey, u32>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admits and increments iff the key is below `limit`.
    ///
    /// Unlimited keys are always admitted but still counted.
    pub fn try_enter(&self, key: &ApiKey, limit: Limit) -> bool {
        let mut counts = self.counts();
        let current = counts.get(key).copied().unwrap_or(0);
        if let Some(max) = limit.max() {
            if current >= max {
                return false;
            }
        }
        counts.insert(key.clone(), current + 1);
        true
    }

    /// Releases one slot for `key`.
    ///
    /// Saturates at zero, so a stray extra call cannot underflow.
    pub fn exit(&self, key: &ApiKey) {
        let mut counts = self.counts();
        match counts.get_mut(key) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                counts.remove(key);
            }
            None => {}
        }
    }

    /// Admits like [`try_enter`](Self::try_enter), returning a slot that
    /// releases itself when dropped.
    pub fn try_acquire(self: &Arc<Self>, key: &ApiKey, limit: Limit) -> Option<ConcurrencySlot> {
        if self.try_enter(key, limit) {
            Some(ConcurrencySlot {
                counter: Arc::clone(self),
                key: key.clone(),
            })
        } else {
            None
        }
    }

    /// Current in-flight count for `key`.
    pub fn in_flight(&self, key: &ApiKey) -> u32 {
        self.counts().get(key).copied().unwrap_or(0)
    }

    /// Number of keys with at least one request in flight.
    pub fn tracked_keys(&self) -> usize {
        self.counts().len()
    }
}

/// One admitted request's hold on its key's concurrency budget.
#[derive(Debug)]
#[must_use = "dropping the slot releases it immediately"]
pub struct ConcurrencySlot {
    counter: Arc<ConcurrencyCounter>,
    key: ApiKey,
}

impl ConcurrencySlot {
    /// The key this slot belongs to.
    pub fn key(&self) -> &ApiKey {
        &self.key
    }
}

impl Drop for ConcurrencySlot {
    fn drop(&mut self) {
        self.counter.exit(&self.key);
    }
}
