//! Mail transport for run notifications.
//!
//! The default implementation posts JSON to an HTTP mail-gateway endpoint
//! (the kind most CI installations already expose in front of SMTP). The
//! trait keeps the transport swappable; tests substitute a recording fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rendered notification ready to send
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

/// Mail transport fault. Always soft: the dispatcher logs it and the run's
/// finalized status is never affected.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to reach mail gateway: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail gateway rejected message: {0}")]
    Rejected(String),
}

/// Outbound mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Response envelope from the mail gateway
#[derive(Debug, Deserialize)]
struct GatewayResponse {
    ok: bool,
    error: Option<String>,
}

/// Configuration for the HTTP mail gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    pub endpoint: String,
    pub token: Option<String>,
}

/// HTTP mail-gateway client
pub struct HttpMailer {
    endpoint: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpMailer {
    /// Create a mailer for the given gateway endpoint
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token,
            client: reqwest::Client::new(),
        }
    }

    /// Create from config
    pub fn from_config(config: MailerConfig) -> Self {
        Self::new(config.endpoint, config.token)
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let mut request = self.client.post(&self.endpoint).json(message);

        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let result: GatewayResponse = response.json().await?;

        if !result.ok {
            return Err(MailError::Rejected(result.error.unwrap_or_default()));
        }

        Ok(())
    }
}
