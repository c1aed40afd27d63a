// src/config/site.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::content::cache::DEFAULT_REVALIDATE_SECS;

pub const ENV_SITE_CONFIG_PATH: &str = "SITE_CONFIG_PATH";
pub const DEFAULT_SITE_CONFIG_PATH: &str = "config/site.toml";

/// Placeholder meaning "read this secret from its environment variable".
const ENV_PLACEHOLDER: &str = "ENV";

fn default_environment() -> String {
    "master".to_string()
}
fn default_delivery_url() -> String {
    "https://cdn.contentful.com".to_string()
}
fn default_preview_url() -> String {
    "https://preview.contentful.com".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_mail_host() -> String {
    "smtp.gmail.com".to_string()
}
fn default_mail_port() -> u16 {
    587
}
fn default_revalidate_secs() -> u64 {
    DEFAULT_REVALIDATE_SECS
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub content: ContentConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    /// Regeneration window for page data, in seconds.
    #[serde(default = "default_revalidate_secs")]
    pub revalidate_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    pub space_id: String,
    /// "ENV" means: read from CONTENTFUL_ACCESS_TOKEN
    pub access_token: String,
    #[serde(default)]
    pub preview_access_token: Option<String>,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_delivery_url")]
    pub delivery_url: String,
    #[serde(default = "default_preview_url")]
    pub preview_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_mail_host")]
    pub host: String,
    #[serde(default = "default_mail_port")]
    pub port: u16,
    /// Implicit TLS when true; STARTTLS (required) otherwise.
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub user: String,
    /// "ENV" means: read from EMAIL_PASSWORD
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub contact_to: Option<String>,
    #[serde(default)]
    pub careers_to: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: default_mail_host(),
            port: default_mail_port(),
            secure: false,
            user: String::new(),
            password: String::new(),
            contact_to: None,
            careers_to: None,
        }
    }
}

impl MailConfig {
    pub fn contact_recipient(&self) -> &str {
        non_empty(self.contact_to.as_deref()).unwrap_or(&self.user)
    }

    pub fn careers_recipient(&self) -> &str {
        non_empty(self.careers_to.as_deref()).unwrap_or(&self.user)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewConfig {
    /// "ENV" means: read from CONTENTFUL_PREVIEW_SECRET
    #[serde(default)]
    pub secret: Option<String>,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_required(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| anyhow!("Missing {key} env var"))
}

fn resolve_placeholder(value: &mut String, key: &str) -> Result<()> {
    if value.trim().eq_ignore_ascii_case(ENV_PLACEHOLDER) {
        *value = env_required(key)?;
    }
    Ok(())
}

fn resolve_optional_placeholder(value: &mut Option<String>, key: &str) {
    if value
        .as_deref()
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(ENV_PLACEHOLDER))
    {
        *value = env_opt(key);
    }
}

impl SiteConfig {
    /// Load from a TOML file, resolving "ENV" secret placeholders.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading site config from {}", path.display()))?;
        let mut cfg: SiteConfig = toml::from_str(&data)
            .with_context(|| format!("parsing site config {}", path.display()))?;

        resolve_placeholder(&mut cfg.content.access_token, "CONTENTFUL_ACCESS_TOKEN")?;
        resolve_optional_placeholder(
            &mut cfg.content.preview_access_token,
            "CONTENTFUL_PREVIEW_ACCESS_TOKEN",
        );
        resolve_placeholder(&mut cfg.mail.password, "EMAIL_PASSWORD")?;
        resolve_optional_placeholder(&mut cfg.preview.secret, "CONTENTFUL_PREVIEW_SECRET");

        cfg.validate()?;
        Ok(cfg)
    }

    /// Build entirely from environment variables (the names the site has
    /// always been deployed with).
    pub fn from_env() -> Result<Self> {
        let port = match env_opt("EMAIL_PORT") {
            Some(p) => p
                .trim()
                .parse::<u16>()
                .with_context(|| format!("EMAIL_PORT is not a port number: {p}"))?,
            None => default_mail_port(),
        };
        let revalidate_secs = match env_opt("REVALIDATE_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("REVALIDATE_SECS is not a number: {v}"))?,
            None => default_revalidate_secs(),
        };

        let cfg = SiteConfig {
            content: ContentConfig {
                space_id: env_required("CONTENTFUL_SPACE_ID")?,
                access_token: env_required("CONTENTFUL_ACCESS_TOKEN")?,
                preview_access_token: env_opt("CONTENTFUL_PREVIEW_ACCESS_TOKEN"),
                environment: env_opt("CONTENTFUL_ENVIRONMENT").unwrap_or_else(default_environment),
                delivery_url: env_opt("CONTENTFUL_DELIVERY_URL").unwrap_or_else(default_delivery_url),
                preview_url: env_opt("CONTENTFUL_PREVIEW_URL").unwrap_or_else(default_preview_url),
                timeout_secs: default_timeout_secs(),
            },
            mail: MailConfig {
                host: env_opt("EMAIL_HOST").unwrap_or_else(default_mail_host),
                port,
                secure: env_opt("EMAIL_SECURE").as_deref() == Some("true"),
                user: env_opt("EMAIL_USER").unwrap_or_default(),
                password: env_opt("EMAIL_PASSWORD").unwrap_or_default(),
                contact_to: env_opt("CONTACT_EMAIL"),
                careers_to: env_opt("CAREERS_EMAIL"),
            },
            preview: PreviewConfig {
                secret: env_opt("CONTENTFUL_PREVIEW_SECRET"),
            },
            revalidate_secs,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolution order:
    /// 1) $SITE_CONFIG_PATH
    /// 2) config/site.toml
    /// 3) environment variables
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_SITE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_SITE_CONFIG_PATH} points to non-existent path");
            }
            return Self::load_from_file(&pb);
        }
        let default_path = PathBuf::from(DEFAULT_SITE_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from_file(&default_path);
        }
        Self::from_env()
    }

    fn validate(&self) -> Result<()> {
        if self.content.space_id.trim().is_empty() {
            bail!("content.space_id must not be empty");
        }
        if self.content.access_token.trim().is_empty() {
            bail!("content.access_token must not be empty");
        }
        if self.revalidate_secs == 0 {
            bail!("revalidate_secs must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipients_fall_back_to_sender_account() {
        let mail = MailConfig {
            user: "studio@example.com".into(),
            contact_to: Some("  ".into()),
            careers_to: Some("jobs@example.com".into()),
            ..MailConfig::default()
        };
        assert_eq!(mail.contact_recipient(), "studio@example.com");
        assert_eq!(mail.careers_recipient(), "jobs@example.com");
    }

    #[test]
    fn toml_defaults_fill_optional_sections() {
        let cfg: SiteConfig = toml::from_str(
            r#"
[content]
space_id = "space"
access_token = "token"
"#,
        )
        .unwrap();
        assert_eq!(cfg.revalidate_secs, 3600);
        assert_eq!(cfg.content.environment, "master");
        assert_eq!(cfg.mail.host, "smtp.gmail.com");
        assert_eq!(cfg.mail.port, 587);
        assert!(cfg.preview.secret.is_none());
    }
}
