//! Chat webhook notifier.
//!
//! Delivers the digest as a plain-text message to a group-chat webhook
//! endpoint. The target surface caps text messages at 2048 bytes, so the
//! body is truncated here; formatting for the chat surface is this sink's
//! concern, not the formatter's.

use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use crate::traits::{Notification, Notifier, NotifyError};
use shelfwatch_core::config::WebhookConfig;

/// Maximum payload text size accepted by the chat surface, in bytes.
const MAX_TEXT_BYTES: usize = 2048;

/// Marker appended when a body had to be cut.
const TRUNCATION_MARKER: &str = "\n...(truncated)";

/// Sends text notifications to a chat webhook endpoint.
#[derive(Debug)]
pub struct ChatWebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl ChatWebhookNotifier {
    /// Build a notifier from webhook configuration.
    ///
    /// Requires a configured URL; the HTTP client carries a short fixed
    /// request timeout so a stalled chat endpoint cannot hold up the run.
    pub fn from_config(config: &WebhookConfig) -> Result<Self, NotifyError> {
        let url = config
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| NotifyError::Config("chat webhook URL is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { url, client })
    }
}

#[async_trait::async_trait]
impl Notifier for ChatWebhookNotifier {
    /// Deliver the notification body as a text message. Attachments are
    /// ignored; the chat surface only takes text.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = text_payload(&notification.body);

        let response = self.client.post(&self.url).json(&payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            warn!(%status, body = %body_text, "chat webhook returned non-2xx status");
            return Err(NotifyError::Config(format!(
                "chat webhook returned {status}: {body_text}"
            )));
        }

        debug!(%status, "chat webhook notification delivered");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }
}

/// The fixed payload shape the chat endpoint accepts.
fn text_payload(body: &str) -> serde_json::Value {
    json!({
        "msgtype": "text",
        "text": { "content": truncate_for_chat(body) }
    })
}

/// Cut a body down to the chat surface's byte limit on a char boundary,
/// appending a marker so readers know the digest continues elsewhere.
fn truncate_for_chat(body: &str) -> String {
    if body.len() <= MAX_TEXT_BYTES {
        return body.to_string();
    }

    let mut cut = MAX_TEXT_BYTES - TRUNCATION_MARKER.len();
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", &body[..cut], TRUNCATION_MARKER)
}
