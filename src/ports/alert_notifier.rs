//! AlertNotifier port - delivery of credit alerts to an external sink.
//!
//! Delivery is best-effort. The gateway dispatches alerts on a detached
//! task and only logs failures, so an implementation may block for as long
//! as its own timeout without affecting the caller's response.

use async_trait::async_trait;

use crate::domain::admission::CreditAlert;

/// Port for sending alerts.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    /// Delivers one alert.
    async fn notify(&self, alert: &CreditAlert) -> Result<(), NotifyError>;
}

/// Errors from alert delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The request never produced a response.
    #[error("alert transport failed: {0}")]
    Transport(String),

    /// The sink answered with a non-success status.
    #[error("alert sink rejected the message with status {0}")]
    Rejected(u16),
}
