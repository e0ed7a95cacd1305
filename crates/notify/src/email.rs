//! SMTP email notifier via `lettre` with TLS support.
//!
//! Delivers the digest as the message body with the tabular export as a
//! file attachment. Port 465 uses implicit TLS; other ports use STARTTLS
//! unless TLS is disabled. There is no send timeout: blocking here blocks
//! the whole run, which is acceptable for a scheduled batch job.

use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::traits::{Notification, Notifier, NotifyError};
use shelfwatch_core::config::MailConfig;

/// Sends notifications as emails via SMTP.
#[derive(Debug)]
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl EmailNotifier {
    /// Build an `EmailNotifier` from mail configuration.
    ///
    /// Requires a parseable sender address and at least one parseable
    /// recipient. Port 465 connects with implicit TLS; any other port uses
    /// STARTTLS when `tls` is set, plaintext otherwise. When a password is
    /// configured, the sender address doubles as the SMTP login.
    pub fn from_config(config: &MailConfig) -> Result<Self, NotifyError> {
        let from: Mailbox = config
            .sender
            .parse()
            .map_err(|e: lettre::address::AddressError| {
                NotifyError::Config(format!("invalid sender address: {e}"))
            })?;

        let to: Vec<Mailbox> = config
            .recipients
            .iter()
            .map(|addr| {
                addr.parse().map_err(|e: lettre::address::AddressError| {
                    NotifyError::Config(format!("invalid recipient '{addr}': {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if to.is_empty() {
            return Err(NotifyError::Config(
                "at least one recipient is required".to_string(),
            ));
        }

        // Port 465 is implicit TLS; everything else is STARTTLS when TLS
        // is enabled.
        let mut builder = if config.smtp_port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .map_err(|e| NotifyError::Config(e.to_string()))?
                .port(config.smtp_port)
        } else if config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| NotifyError::Config(e.to_string()))?
                .port(config.smtp_port)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
        };

        if let Some(password) = &config.password {
            builder = builder.credentials(Credentials::new(
                config.sender.clone(),
                password.clone(),
            ));
        }

        let transport = builder.build();

        Ok(Self { transport, from, to })
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    /// Send a notification email to all configured recipients, attaching
    /// the payload when one is present.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut message_builder = Message::builder().from(self.from.clone());

        for recipient in &self.to {
            message_builder = message_builder.to(recipient.clone());
        }
        message_builder = message_builder.subject(&notification.subject);

        let email = match &notification.attachment {
            Some(attachment) => {
                let content_type =
                    ContentType::parse(&attachment.content_type).map_err(|e| {
                        NotifyError::Config(format!(
                            "invalid attachment content type '{}': {e}",
                            attachment.content_type
                        ))
                    })?;
                let part = Attachment::new(attachment.filename.clone())
                    .body(attachment.bytes.clone(), content_type);
                message_builder
                    .multipart(
                        MultiPart::mixed()
                            .singlepart(SinglePart::plain(notification.body.clone()))
                            .singlepart(part),
                    )
                    .map_err(|e| NotifyError::Smtp(e.to_string()))?
            }
            None => message_builder
                .body(notification.body.clone())
                .map_err(|e| NotifyError::Smtp(e.to_string()))?,
        };

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        info!(
            channel = "email",
            subject = %notification.subject,
            recipients = self.to.len(),
            attachment = notification.attachment.is_some(),
            "notification delivered"
        );

        Ok(())
    }

    /// Returns `"email"`.
    fn channel_name(&self) -> &str {
        "email"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_config(sender: &str, recipients: &[&str], port: u16, tls: bool) -> MailConfig {
        MailConfig {
            smtp_host: "smtp.example.com".into(),
            smtp_port: port,
            sender: sender.into(),
            password: Some("secret".into()),
            recipients: recipients.iter().map(|s| s.to_string()).collect(),
            tls,
        }
    }

    #[test]
    fn from_config_valid() {
        let notifier = EmailNotifier::from_config(&mail_config(
            "alerts@example.com",
            &["admin@example.com"],
            587,
            true,
        ));
        assert!(notifier.is_ok());
    }

    #[test]
    fn from_config_invalid_sender() {
        let result = EmailNotifier::from_config(&mail_config(
            "bad-address",
            &["admin@example.com"],
            587,
            true,
        ));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid sender"), "got: {err}");
    }

    #[test]
    fn from_config_invalid_recipient() {
        let result = EmailNotifier::from_config(&mail_config(
            "alerts@example.com",
            &["not-valid"],
            587,
            true,
        ));
        assert!(result.is_err());
    }

    #[test]
    fn from_config_empty_recipients() {
        let result =
            EmailNotifier::from_config(&mail_config("alerts@example.com", &[], 587, true));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("at least one recipient"), "got: {err}");
    }

    #[test]
    fn from_config_implicit_tls_port() {
        let notifier = EmailNotifier::from_config(&mail_config(
            "alerts@example.com",
            &["admin@example.com"],
            465,
            true,
        ));
        assert!(notifier.is_ok());
    }

    #[test]
    fn from_config_no_tls() {
        let notifier = EmailNotifier::from_config(&mail_config(
            "alerts@example.com",
            &["admin@example.com"],
            25,
            false,
        ));
        assert!(notifier.is_ok());
    }

    #[test]
    fn channel_name_is_email() {
        let notifier = EmailNotifier::from_config(&mail_config(
            "alerts@example.com",
            &["admin@example.com"],
            465,
            true,
        ))
        .unwrap();
        assert_eq!(notifier.channel_name(), "email");
    }
}
