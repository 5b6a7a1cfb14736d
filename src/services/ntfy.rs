//! Push delivery over ntfy
//!
//! Publishes one JSON message per fired alert to the configured topic.
//! Delivery is retried a small bounded number of times with a short constant
//! backoff; dry-run mode logs the message instead of sending it.

use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::NtfyConfig;
use crate::error::WatchError;
use crate::models::NotificationMessage;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Attempt delivery of a rendered notification.
    async fn send(&self, message: &NotificationMessage) -> Result<(), WatchError>;
}

#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    topic: &'a str,
    title: &'a str,
    message: &'a str,
    markdown: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    click: Option<&'a str>,
}

pub struct NtfyNotifier {
    server: String,
    topic: String,
    dry_run: bool,
    client: reqwest::Client,
}

impl NtfyNotifier {
    pub fn new(config: &NtfyConfig, dry_run: bool) -> Result<Self, WatchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| WatchError::send(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self::with_client(&config.server, &config.topic, dry_run, client))
    }

    /// Create a notifier against a custom server URL (used by tests).
    pub fn with_client(
        server: impl Into<String>,
        topic: impl Into<String>,
        dry_run: bool,
        client: reqwest::Client,
    ) -> Self {
        let server: String = server.into();
        Self {
            server: server.trim_end_matches('/').to_string(),
            topic: topic.into(),
            dry_run,
            client,
        }
    }

    async fn publish(&self, message: &NotificationMessage) -> Result<(), WatchError> {
        let request = PublishRequest {
            topic: &self.topic,
            title: &message.title,
            message: &message.body,
            markdown: true,
            click: message.click_url.as_deref(),
        };
        self.client
            .post(&self.server)
            .json(&request)
            .send()
            .await
            .map_err(|e| WatchError::send(format!("ntfy request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| WatchError::send(format!("ntfy rejected the message: {}", e)))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for NtfyNotifier {
    async fn send(&self, message: &NotificationMessage) -> Result<(), WatchError> {
        if self.dry_run {
            info!(
                title = %message.title,
                click = ?message.click_url,
                "dry run, not sending:\n{}",
                message.body
            );
            return Ok(());
        }
        (|| self.publish(message))
            .retry(
                ConstantBuilder::default()
                    .with_delay(Duration::from_millis(500))
                    .with_max_times(2),
            )
            .notify(|err: &WatchError, after: Duration| {
                warn!(error = %err, retry_in = ?after, "push delivery failed, retrying");
            })
            .await
    }
}
