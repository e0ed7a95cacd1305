//! Notifier trait definition and shared error types.

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("Export serialization failed: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A binary attachment carried with a notification.
///
/// Only channels that support attachments (email) deliver it; text-only
/// channels ignore it.
#[derive(Debug, Clone)]
pub struct AttachmentPayload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A rendered notification ready for delivery.
#[derive(Debug, Clone)]
pub struct Notification {
    /// The rendered subject/title.
    pub subject: String,
    /// The rendered body content.
    pub body: String,
    /// Optional attachment for channels that support one.
    pub attachment: Option<AttachmentPayload>,
}

impl Notification {
    pub fn text(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: AttachmentPayload) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Trait for notification channel implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification through this channel.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Human-readable name for this channel (e.g., "webhook", "email").
    fn channel_name(&self) -> &str;
}

/// Result of dispatching a notification to a single channel.
#[derive(Debug)]
pub struct DispatchResult {
    pub channel: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}
