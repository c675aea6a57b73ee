//! Cumulative spend per key, with one-shot "limit hit" alerts.
//!
//! Spend only ever grows. Alerts are returned to the caller as values; the
//! ledger itself performs no I/O.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::foundation::{ApiKey, CreditCeiling};

/// Which credit event produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditAlertKind {
    /// A request arrived for a key already at or over its ceiling.
    AlreadyExceeded,
    /// A recorded cost pushed the key to or over its ceiling.
    LimitReached,
}

/// A notification that a key's spend reached the credit ceiling.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditAlert {
    /// Fingerprint of the offending key.
    pub key_fingerprint: String,
    /// What triggered the alert.
    pub kind: CreditAlertKind,
    /// Spend at the time of the alert.
    pub spent: f64,
    /// The configured ceiling.
    pub ceiling: f64,
}

impl CreditAlert {
    /// Human-readable message sent to the alert sink.
    pub fn message(&self) -> String {
        match self.kind {
            CreditAlertKind::AlreadyExceeded => {
                format!("API key {} exceeded credit limit", self.key_fingerprint)
            }
            CreditAlertKind::LimitReached => {
                format!("API key {} hit credit limit", self.key_fingerprint)
            }
        }
    }
}

impl fmt::Display for CreditAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.4} / {:.4})", self.message(), self.spent, self.ceiling)
    }
}

/// Result of the pre-forward credit check.
#[derive(Debug, Clone, PartialEq)]
pub enum CreditCheck {
    /// Spend is below the ceiling, or enforcement is disabled.
    Within,
    /// Spend is at or over the ceiling; the request must be rejected.
    Exceeded(CreditAlert),
}

impl CreditCheck {
    /// Returns true if the request must be blocked.
    pub fn is_exceeded(&self) -> bool {
        matches!(self, CreditCheck::Exceeded(_))
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    spend: HashMap<ApiKey, f64>,
    alerted: HashSet<ApiKey>,
}

/// Per-key spend ledger and the set of keys already alerted.
///
/// Alerting is once per key per process lifetime; nothing is ever removed
/// from the alerted set.
#[derive(Debug, Default)]
pub struct CreditLedger {
    state: Mutex<LedgerState>,
}

impl CreditLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Checks whether `key` is already at or over `ceiling`.
    ///
    /// An exceeded check always carries an alert; these pre-check alerts are
    /// not deduplicated.
    pub fn check(&self, key: &ApiKey, ceiling: CreditCeiling) -> CreditCheck {
        let CreditCeiling::Ceiling(limit) = ceiling else {
            return CreditCheck::Within;
        };
        let spent = self.state().spend.get(key).copied().unwrap_or(0.0);
        if ceiling.is_reached(spent) {
            CreditCheck::Exceeded(CreditAlert {
                key_fingerprint: key.fingerprint(),
                kind: CreditAlertKind::AlreadyExceeded,
                spent,
                ceiling: limit,
            })
        } else {
            CreditCheck::Within
        }
    }

    /// Adds `cost` to `key`'s spend.
    ///
    /// Returns an alert the first time the new total reaches the ceiling.
    /// Non-positive and non-finite costs are ignored.
    pub fn record_cost(&self, key: &ApiKey, cost: f64, ceiling: CreditCeiling) -> Option<CreditAlert> {
        if !cost.is_finite() || cost <= 0.0 {
            return None;
        }

        let mut state = self.state();
        let total = {
            let entry = state.spend.entry(key.clone()).or_insert(0.0);
            *entry += cost;
            *entry
        };

        let CreditCeiling::Ceiling(limit) = ceiling else {
            return None;
        };
        if ceiling.is_reached(total) && state.alerted.insert(key.clone()) {
            return Some(CreditAlert {
                key_fingerprint: key.fingerprint(),
                kind: CreditAlertKind::LimitReached,
                spent: total,
                ceiling: limit,
            });
        }
        None
    }

    /// Total spend recorded for `key`.
    pub fn spent(&self, key: &ApiKey) -> f64 {
        self.state().spend.get(key).copied().unwrap_or(0.0)
    }

    /// Returns true if `key` has already produced its limit-reached alert.
    pub fn has_alerted(&self, key: &ApiKey) -> bool {
        self.state().alerted.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key(raw: &str) -> ApiKey {
        ApiKey::new(raw).unwrap()
    }

    // ─── Pre-check ────────────────────────────────────────────────────

    #[test]
    fn disabled_ceiling_never_blocks() {
        let ledger = CreditLedger::new();
        let k = key("sk-1");

        ledger.record_cost(&k, 1_000_000.0, CreditCeiling::Disabled);
        assert_eq!(ledger.check(&k, CreditCeiling::Disabled), CreditCheck::Within);
    }

    #[test]
    fn fresh_key_is_within_limit() {
        let ledger = CreditLedger::new();
        let check = ledger.check(&key("sk-1"), CreditCeiling::from_raw(1.0));
        assert!(!check.is_exceeded());
    }

    #[test]
    fn check_blocks_at_ceiling_and_carries_alert() {
        let ledger = CreditLedger::new();
        let k = key("sk-1");
        let ceiling = CreditCeiling::from_raw(1.0);

        ledger.record_cost(&k, 1.0, ceiling);
        match ledger.check(&k, ceiling) {
            CreditCheck::Exceeded(alert) => {
                assert_eq!(alert.kind, CreditAlertKind::AlreadyExceeded);
                assert_eq!(alert.key_fingerprint, k.fingerprint());
                assert!(alert.message().ends_with("exceeded credit limit"));
            }
            CreditCheck::Within => panic!("expected exceeded"),
        }
    }

    #[test]
    fn pre_check_alerts_repeat_for_every_blocked_request() {
        let ledger = CreditLedger::new();
        let k = key("sk-1");
        let ceiling = CreditCeiling::from_raw(1.0);

        ledger.record_cost(&k, 2.0, ceiling);
        assert!(ledger.check(&k, ceiling).is_exceeded());
        assert!(ledger.check(&k, ceiling).is_exceeded());
    }

    // ─── Recording ────────────────────────────────────────────────────

    #[test]
    fn record_cost_sums_exactly() {
        let ledger = CreditLedger::new();
        let k = key("sk-1");

        ledger.record_cost(&k, 0.25, CreditCeiling::Disabled);
        ledger.record_cost(&k, 0.5, CreditCeiling::Disabled);
        ledger.record_cost(&k, 1.25, CreditCeiling::Disabled);
        assert_eq!(ledger.spent(&k), 2.0);
    }

    #[test]
    fn negative_zero_and_nan_costs_are_ignored() {
        let ledger = CreditLedger::new();
        let k = key("sk-1");

        ledger.record_cost(&k, 1.0, CreditCeiling::Disabled);
        ledger.record_cost(&k, -5.0, CreditCeiling::Disabled);
        ledger.record_cost(&k, 0.0, CreditCeiling::Disabled);
        ledger.record_cost(&k, f64::NAN, CreditCeiling::Disabled);
        ledger.record_cost(&k, f64::INFINITY, CreditCeiling::Disabled);
        assert_eq!(ledger.spent(&k), 1.0);
    }

    #[test]
    fn crossing_the_ceiling_alerts_exactly_once() {
        let ledger = CreditLedger::new();
        let k = key("sk-1");
        let ceiling = CreditCeiling::from_raw(1.0);

        assert!(ledger.record_cost(&k, 0.6, ceiling).is_none());
        let alert = ledger.record_cost(&k, 0.6, ceiling).expect("crossing alert");
        assert_eq!(alert.kind, CreditAlertKind::LimitReached);
        assert!(alert.message().ends_with("hit credit limit"));
        assert!(ledger.has_alerted(&k));

        assert!(ledger.record_cost(&k, 5.0, ceiling).is_none());
        assert!(ledger.record_cost(&k, 5.0, ceiling).is_none());
    }

    #[test]
    fn alerts_are_per_key() {
        let ledger = CreditLedger::new();
        let ceiling = CreditCeiling::from_raw(1.0);

        assert!(ledger.record_cost(&key("a"), 1.0, ceiling).is_some());
        assert!(ledger.record_cost(&key("b"), 1.0, ceiling).is_some());
    }

    #[test]
    fn spend_recorded_while_disabled_never_alerts() {
        let ledger = CreditLedger::new();
        let k = key("sk-1");

        assert!(ledger.record_cost(&k, 100.0, CreditCeiling::Disabled).is_none());
        assert!(!ledger.has_alerted(&k));
    }

    #[test]
    fn alert_message_hides_raw_key() {
        let ledger = CreditLedger::new();
        let k = key("sk-live-secret");
        let alert = ledger
            .record_cost(&k, 2.0, CreditCeiling::from_raw(1.0))
            .unwrap();
        assert!(!alert.message().contains("sk-live-secret"));
        assert!(!alert.to_string().contains("sk-live-secret"));
    }

    // ─── Properties ───────────────────────────────────────────────────

    proptest! {
        #[test]
        fn spend_is_the_sum_of_positive_costs(
            cents in proptest::collection::vec(0u32..10_000, 0..100),
        ) {
            let ledger = CreditLedger::new();
            let k = key("prop");
            let mut expected = 0.0;
            let mut previous = 0.0;

            for c in cents {
                // Quarter-cent steps are exactly representable.
                let cost = f64::from(c) / 4.0;
                ledger.record_cost(&k, cost, CreditCeiling::Disabled);
                expected += cost;
                let now = ledger.spent(&k);
                prop_assert!(now >= previous);
                previous = now;
            }
            prop_assert_eq!(ledger.spent(&k), expected);
        }

        #[test]
        fn at_most_one_limit_alert_per_key(
            costs in proptest::collection::vec(0.01f64..5.0, 1..50),
            ceiling in 0.5f64..20.0,
        ) {
            let ledger = CreditLedger::new();
            let k = key("prop");
            let ceiling = CreditCeiling::from_raw(ceiling);

            let alerts = costs
                .iter()
                .filter_map(|cost| ledger.record_cost(&k, *cost, ceiling))
                .count();
            prop_assert!(alerts <= 1);
            prop_assert_eq!(alerts == 1, ceiling.is_reached(ledger.spent(&k)));
        }
    }
}
