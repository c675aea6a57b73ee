//! Webhook alert sink.
//!
//! POSTs `{"text": "<message>"}`, the payload shape accepted by Slack and
//! most chat incoming-webhook endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::domain::admission::CreditAlert;
use crate::ports::{AlertNotifier, NotifyError};

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Sends alerts to a configured webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    /// Creates a notifier posting to `url` with a per-request `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The configured sink URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AlertNotifier for WebhookNotifier {
    async fn notify(&self, alert: &CreditAlert) -> Result<(), NotifyError> {
        let message = alert.message();
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text: &message })
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        tracing::debug!(key = %alert.key_fingerprint, "Delivered credit alert");
        Ok(())
    }
}
