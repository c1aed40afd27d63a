// src/preview.rs
//! Draft-content viewing mode, enabled by a shared secret and carried in a cookie.

use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};

pub const PREVIEW_COOKIE: &str = "mars_draft_mode";

#[derive(Debug, Clone, Default)]
pub struct PreviewGate {
    secret: Option<String>,
}

impl PreviewGate {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// True only when a secret is configured and `provided` matches it.
    pub fn accepts(&self, provided: Option<&str>) -> bool {
        match (&self.secret, provided) {
            (Some(secret), Some(given)) => constant_time_eq(secret.as_bytes(), given.as_bytes()),
            _ => false,
        }
    }

    /// Cookie value proving draft mode was enabled with the current secret.
    pub fn token(&self) -> Option<String> {
        self.secret.as_deref().map(|s| {
            let digest = Sha256::digest(format!("draft-mode:{s}").as_bytes());
            hex_lower(&digest)
        })
    }

    pub fn enable_cookie(&self) -> Option<String> {
        self.token().map(|t| {
            format!("{PREVIEW_COOKIE}={t}; Path=/; HttpOnly; Secure; SameSite=None")
        })
    }

    pub fn clear_cookie() -> String {
        format!("{PREVIEW_COOKIE}=; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=0")
    }

    /// Whether the request carries a valid draft-mode cookie.
    pub fn is_draft(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.token() else {
            return false;
        };
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .any(|(name, value)| name == PREVIEW_COOKIE && value == expected)
    }
}

/// Only same-site absolute paths are accepted as redirect targets.
pub fn redirect_target(slug: Option<&str>) -> &str {
    match slug {
        Some(s) if s.starts_with('/') && !s.starts_with("//") && !s.contains('\\') => s,
        _ => "/",
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
