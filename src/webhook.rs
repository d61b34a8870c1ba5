use async_trait::async_trait;
use chrono::Utc;

use crate::error::DeliveryError;
use crate::models::{ContactSubmission, WebhookPayload};

/// Outbound notification sink. The handler treats this as a black box that
/// either accepts the submission or fails; tests substitute their own.
#[async_trait]
pub trait NotifySink: Send + Sync {
    async fn notify(&self, submission: &ContactSubmission) -> Result<(), DeliveryError>;
}

/// Posts submissions as embed payloads to the configured webhook URL.
/// The shared reqwest client carries the request timeout; there is no retry.
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl NotifySink for WebhookSink {
    async fn notify(&self, submission: &ContactSubmission) -> Result<(), DeliveryError> {
        let payload = WebhookPayload::from_submission(submission, Utc::now());
        let response = self.client.post(&self.url).json(&payload).send().await?;

        // The response body is never interpreted, only the status matters
        if !response.status().is_success() {
            return Err(DeliveryError::Status(response.status()));
        }
        Ok(())
    }
}
