// src/relay/mod.rs
//! Form relay: turns a contact or job-application submission into one
//! outbound HTML email.
//!
//! Submitted values are embedded verbatim. The only transformation is
//! converting line breaks in the free-text message to `<br>`.

pub mod mail;
pub mod smtp;

use std::sync::Arc;

use metrics::counter;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub use mail::{MailChannel, MailError, OutboundMail};

use crate::config::MailConfig;

const CONTACT_SENDER_NAME: &str = "MARS Design Website";
const CAREERS_SENDER_NAME: &str = "MARS Design Careers";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(deserialize_with = "lenient_text")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_text")]
    pub subject: String,
    #[serde(deserialize_with = "lenient_text")]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationForm {
    #[serde(deserialize_with = "lenient_text")]
    pub full_name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(deserialize_with = "lenient_text")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_text")]
    pub position: String,
    #[serde(deserialize_with = "lenient_text")]
    pub portfolio: String,
    #[serde(deserialize_with = "lenient_text")]
    pub message: String,
}

/// Accept any JSON value for a form field: `null` is blank, scalars are
/// rendered as text and nested values as their JSON encoding.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

fn or_else<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn message_html(message: &str) -> String {
    message.replace('\n', "<br>")
}

pub fn contact_subject(form: &ContactForm) -> String {
    format!("Contact Form: {}", or_else(&form.subject, "New Contact Inquiry"))
}

pub fn contact_html(form: &ContactForm) -> String {
    format!(
        r#"
        <h2>New Contact Form Submission</h2>
        <p><strong>Name:</strong> {name}</p>
        <p><strong>Email:</strong> {email}</p>
        <p><strong>Phone:</strong> {phone}</p>
        <p><strong>Subject:</strong> {subject}</p>
        <p><strong>Message:</strong></p>
        <p>{message}</p>
      "#,
        name = form.name,
        email = form.email,
        phone = or_else(&form.phone, "Not provided"),
        subject = or_else(&form.subject, "Not specified"),
        message = message_html(&form.message),
    )
}

pub fn application_subject(form: &ApplicationForm) -> String {
    format!(
        "Job Application: {}",
        or_else(&form.position, "General Application")
    )
}

pub fn application_html(form: &ApplicationForm) -> String {
    format!(
        r#"
        <h2>New Job Application</h2>
        <p><strong>Name:</strong> {name}</p>
        <p><strong>Email:</strong> {email}</p>
        <p><strong>Phone:</strong> {phone}</p>
        <p><strong>Position:</strong> {position}</p>
        <p><strong>Portfolio URL:</strong> {portfolio}</p>
        <p><strong>Cover Letter / Additional Information:</strong></p>
        <p>{message}</p>
      "#,
        name = form.full_name,
        email = form.email,
        phone = or_else(&form.phone, "Not provided"),
        position = or_else(&form.position, "Not specified"),
        portfolio = or_else(&form.portfolio, "Not provided"),
        message = message_html(&form.message),
    )
}

/// Relay bound to a mail channel and the studio's mailboxes.
pub struct Relay {
    channel: Arc<dyn MailChannel>,
    sender: String,
    contact_to: String,
    careers_to: String,
}

impl Relay {
    pub fn new(
        channel: Arc<dyn MailChannel>,
        sender: impl Into<String>,
        contact_to: impl Into<String>,
        careers_to: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            sender: sender.into(),
            contact_to: contact_to.into(),
            careers_to: careers_to.into(),
        }
    }

    pub fn from_config(channel: Arc<dyn MailChannel>, cfg: &MailConfig) -> Self {
        Self::new(
            channel,
            cfg.user.clone(),
            cfg.contact_recipient(),
            cfg.careers_recipient(),
        )
    }

    fn from_mailbox(&self, display_name: &str) -> String {
        format!("\"{display_name}\" <{}>", self.sender)
    }

    pub fn contact_mail(&self, form: &ContactForm) -> OutboundMail {
        OutboundMail {
            from: self.from_mailbox(CONTACT_SENDER_NAME),
            to: self.contact_to.clone(),
            reply_to: Some(form.email.clone()),
            subject: contact_subject(form),
            html: contact_html(form),
        }
    }

    pub fn application_mail(&self, form: &ApplicationForm) -> OutboundMail {
        OutboundMail {
            from: self.from_mailbox(CAREERS_SENDER_NAME),
            to: self.careers_to.clone(),
            reply_to: Some(form.email.clone()),
            subject: application_subject(form),
            html: application_html(form),
        }
    }

    pub async fn send_contact(&self, form: &ContactForm) -> Result<(), MailError> {
        tracing::info!(
            target: "relay",
            name = %form.name,
            email = %form.email,
            subject = %form.subject,
            "received contact submission"
        );
        self.dispatch("contact", self.contact_mail(form)).await
    }

    pub async fn send_application(&self, form: &ApplicationForm) -> Result<(), MailError> {
        tracing::info!(
            target: "relay",
            name = %form.full_name,
            email = %form.email,
            position = %form.position,
            "received job application"
        );
        self.dispatch("application", self.application_mail(form)).await
    }

    async fn dispatch(&self, form: &'static str, mail: OutboundMail) -> Result<(), MailError> {
        crate::metrics::ensure_described();
        match self.channel.send(mail).await {
            Ok(()) => {
                counter!("relay_sent_total", "form" => form).increment(1);
                Ok(())
            }
            Err(e) => {
                counter!("relay_failures_total", "form" => form).increment(1);
                tracing::error!(
                    target: "relay",
                    form,
                    channel = self.channel.name(),
                    code = e.code.as_deref().unwrap_or("-"),
                    response_code = ?e.response_code,
                    error = %e.message,
                    "mail send failed"
                );
                Err(e)
            }
        }
    }
}
