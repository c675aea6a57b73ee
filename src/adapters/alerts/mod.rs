//! Alert notifier adapters.
//!
//! - `WebhookNotifier` - JSON POST to a configured webhook
//! - `InMemoryNotifier` - records alerts (tests, development)
//! - `NoopNotifier` - used when no sink is configured

mod in_memory;
mod webhook;

pub use in_memory::InMemoryNotifier;
pub use webhook::WebhookNotifier;

use async_trait::async_trait;

use crate::domain::admission::CreditAlert;
use crate::ports::{AlertNotifier, NotifyError};

/// Notifier that silently drops every alert.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl AlertNotifier for NoopNotifier {
    async fn notify(&self, _alert: &CreditAlert) -> Result<(), NotifyError> {
        Ok(())
    }
}
