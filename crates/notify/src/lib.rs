//! Notification sinks for expiry alerts.
//!
//! This crate provides:
//! - `Notifier` trait for pluggable notification channels
//! - Chat-webhook and SMTP email notifier implementations
//! - CSV serialization of the tabular export for email attachments
//! - Best-effort dispatch where one failing channel never blocks another

pub mod dispatcher;
pub mod email;
pub mod export;
pub mod traits;
pub mod webhook;

pub use dispatcher::Dispatcher;
pub use traits::{AttachmentPayload, Notification, Notifier, NotifyError};
