//! In-memory alert sink for tests and local development.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::admission::CreditAlert;
use crate::ports::{AlertNotifier, NotifyError};

/// Records every alert it is asked to deliver.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    alerts: Arc<Mutex<Vec<CreditAlert>>>,
}

impl InMemoryNotifier {
    /// Creates an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<CreditAlert>> {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Alerts delivered so far, oldest first.
    pub fn alerts(&self) -> Vec<CreditAlert> {
        self.recorded().clone()
    }

    /// Number of alerts delivered so far.
    pub fn len(&self) -> usize {
        self.recorded().len()
    }

    /// Returns true if nothing has been delivered.
    pub fn is_empty(&self) -> bool {
        self.recorded().is_empty()
    }
}

#[async_trait]
impl AlertNotifier for InMemoryNotifier {
    async fn notify(&self, alert: &CreditAlert) -> Result<(), NotifyError> {
        self.recorded().push(alert.clone());
        Ok(())
    }
}
