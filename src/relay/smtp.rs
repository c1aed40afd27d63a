// src/relay/smtp.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::mail::{MailChannel, MailError, OutboundMail};
use crate::config::MailConfig;

pub struct SmtpChannel {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpChannel {
    pub fn from_config(cfg: &MailConfig) -> Result<Self> {
        let builder = if cfg.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
        }
        .with_context(|| format!("invalid EMAIL_HOST: {}", cfg.host))?
        .port(cfg.port);

        let builder = if cfg.user.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(cfg.user.clone(), cfg.password.clone()))
        };

        tracing::info!(
            target: "relay",
            host = %cfg.host,
            port = cfg.port,
            secure = cfg.secure,
            user = %cfg.user,
            "smtp channel configured"
        );

        Ok(Self {
            mailer: builder.build(),
        })
    }
}

fn mailbox(field: &str, value: &str) -> Result<Mailbox, MailError> {
    value
        .parse::<Mailbox>()
        .map_err(|e| MailError::new("EENVELOPE", format!("invalid {field} address '{value}': {e}")))
}

fn smtp_failure(err: lettre::transport::smtp::Error) -> MailError {
    let response_code = err
        .status()
        .and_then(|code| code.to_string().parse::<u16>().ok());
    let code = match response_code {
        Some(530 | 534 | 535) => "EAUTH",
        _ if err.is_timeout() => "ETIMEDOUT",
        _ if err.is_permanent() || err.is_transient() => "EPROTOCOL",
        _ => "ECONNECTION",
    };
    let out = MailError::new(code, err.to_string());
    match response_code {
        Some(rc) => out.with_response_code(rc),
        None => out,
    }
}

#[async_trait]
impl MailChannel for SmtpChannel {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(mailbox("from", &mail.from)?)
            .to(mailbox("to", &mail.to)?)
            .subject(mail.subject);
        if let Some(reply_to) = mail.reply_to.as_deref().filter(|r| !r.trim().is_empty()) {
            builder = builder.reply_to(mailbox("reply-to", reply_to)?);
        }

        let msg = builder
            .header(header::ContentType::TEXT_HTML)
            .body(mail.html)
            .map_err(|e| MailError::new("EMESSAGE", e.to_string()))?;

        self.mailer.send(msg).await.map_err(smtp_failure)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
