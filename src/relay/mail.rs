// src/relay/mail.rs
use async_trait::async_trait;
use serde::Serialize;

/// One transactional email, fully rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    /// Mailbox string, e.g. `"MARS Design Website" <studio@example.com>`.
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
}

/// Structured failure reported by a mail channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct MailError {
    /// Short machine code (`EAUTH`, `ECONNECTION`, ...).
    pub code: Option<String>,
    pub message: String,
    /// SMTP reply code when the server answered.
    pub response_code: Option<u16>,
}

impl MailError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.to_string()),
            message: message.into(),
            response_code: None,
        }
    }

    pub fn with_response_code(mut self, code: u16) -> Self {
        self.response_code = Some(code);
        self
    }
}

/// Outbound mail boundary. Implementations send exactly once; no retry.
#[async_trait]
pub trait MailChannel: Send + Sync {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError>;
    fn name(&self) -> &'static str;
}
