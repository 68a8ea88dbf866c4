//! Driving port for out-of-band mail delivery.
//!
//! Signup hands confirmation codes to this port; delivery failures are
//! surfaced to the caller rather than swallowed, so a broken transport shows
//! up as a failed signup instead of a silently missing email.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

/// Delivery errors raised by mail adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailDeliveryError {
    /// The transport rejected or failed to accept the message.
    #[error("mail delivery failed: {message}")]
    Delivery { message: String },
}

impl MailDeliveryError {
    /// Create a delivery error with the given message.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }
}

/// Port for sending a single plain-text message.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver `body` to `recipient` under `subject`.
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailDeliveryError>;
}

/// Mailer that logs messages instead of delivering them.
///
/// Default for local development and database-less deployments; the code is
/// visible in the structured log so the token exchange stays usable.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailDeliveryError> {
        info!(recipient, subject, body, "outbound mail (tracing transport)");
        Ok(())
    }
}

/// A message captured by [`RecordingMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Mailer that records messages for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail_next: Mutex<Option<String>>,
}

impl RecordingMailer {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered so far, oldest first.
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Make the next `send` call fail with the given message.
    pub fn fail_next(&self, message: impl Into<String>) {
        *self
            .fail_next
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(message.into());
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailDeliveryError> {
        if let Some(message) = self
            .fail_next
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()
        {
            return Err(MailDeliveryError::delivery(message));
        }
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(SentMail {
                recipient: recipient.to_owned(),
                subject: subject.to_owned(),
                body: body.to_owned(),
            });
        Ok(())
    }
}
