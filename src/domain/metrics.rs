//! Per-provider latency totals and their text exposition.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Metric name rendered for every provider line.
pub const LATENCY_METRIC: &str = "gateway_request_latency_ms_total";

/// Content type of [`MetricsRegistry::render`] output.
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Monotonic latency counters keyed by provider name.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    latency_ms: Mutex<BTreeMap<String, u64>>,
}

impl MetricsRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn latency(&self) -> MutexGuard<'_, BTreeMap<String, u64>> {
        self.latency_ms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds `duration_ms` to the provider's total.
    pub fn record(&self, provider: &str, duration_ms: u64) {
        let mut latency = self.latency();
        let total = latency.entry(provider.to_string()).or_insert(0);
        *total = total.saturating_add(duration_ms);
    }

    /// Accumulated latency for `provider`, if any was recorded.
    pub fn total(&self, provider: &str) -> Option<u64> {
        self.latency().get(provider).copied()
    }

    /// Renders one line per provider, newline-terminated.
    pub fn render(&self) -> String {
        let latency = self.latency();
        let mut out = String::new();
        for (provider, total) in latency.iter() {
            let _ = writeln!(out, "{}{{provider=\"{}\"}} {}", LATENCY_METRIC, provider, total);
        }
        out
    }

    /// Clears every counter. Test isolation only.
    pub fn reset(&self) {
        self.latency().clear();
    }
}
