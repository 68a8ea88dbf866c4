//! Reqwest-backed mail gateway adapter.
//!
//! Owns transport details only: the gateway accepts a JSON payload of
//! `{from, to, subject, body}` on a single POST endpoint. Non-2xx responses
//! and transport failures both surface as delivery errors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::domain::ports::{MailDeliveryError, Mailer};

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// Settings for the outbound mail gateway.
#[derive(Debug, Clone)]
pub struct MailGatewayConfig {
    /// POST endpoint accepting the JSON message payload.
    pub endpoint: Url,
    /// Sender address stamped on every message.
    pub from_address: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl MailGatewayConfig {
    /// Build a configuration with the default request timeout.
    pub fn new(endpoint: Url, from_address: impl Into<String>) -> Self {
        Self {
            endpoint,
            from_address: from_address.into(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        }
    }
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Mailer that relays messages to an HTTP mail gateway.
pub struct HttpGatewayMailer {
    client: Client,
    config: MailGatewayConfig,
}

impl HttpGatewayMailer {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: MailGatewayConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Mailer for HttpGatewayMailer {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailDeliveryError> {
        let payload = OutboundMessage {
            from: &self.config.from_address,
            to: recipient,
            subject,
            body,
        };
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|err| MailDeliveryError::delivery(err.to_string()))?;

        if !response.status().is_success() {
            return Err(MailDeliveryError::delivery(format!(
                "mail gateway responded with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}
