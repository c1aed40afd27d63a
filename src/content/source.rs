// src/content/source.rs
use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::config::site::ContentConfig;
use crate::content::{ContentError, ContentKind};

/// Link depth resolved from `includes`, matching `include=2` on the query.
pub const INCLUDE_DEPTH: u8 = 2;

/// Maximum page size accepted by the delivery API.
const PAGE_LIMIT: u32 = 1000;

/// Query-by-kind boundary to the content repository. Returned items are
/// loosely-typed field bags with links already resolved.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn entries(&self, kind: ContentKind) -> Result<Vec<Value>, ContentError>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct EntryCollection {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, Default, Deserialize)]
pub struct Includes {
    #[serde(rename = "Asset", default)]
    pub assets: Vec<Value>,
    #[serde(rename = "Entry", default)]
    pub entries: Vec<Value>,
}

/// Client for the Contentful delivery (or preview) API. Constructed
/// explicitly from configuration and shared through `AppState`.
#[derive(Clone)]
pub struct ContentfulClient {
    http: reqwest::Client,
    base_url: String,
    space_id: String,
    environment: String,
    access_token: String,
    label: &'static str,
}

impl ContentfulClient {
    /// Client for published content.
    pub fn delivery(cfg: &ContentConfig) -> anyhow::Result<Self> {
        Self::build(cfg, &cfg.delivery_url, &cfg.access_token, "delivery")
    }

    /// Client for draft content; `None` when no preview token is configured.
    pub fn preview(cfg: &ContentConfig) -> anyhow::Result<Option<Self>> {
        match cfg.preview_access_token.as_deref() {
            Some(token) if !token.is_empty() => {
                Self::build(cfg, &cfg.preview_url, token, "preview").map(Some)
            }
            _ => Ok(None),
        }
    }

    fn build(
        cfg: &ContentConfig,
        base_url: &str,
        token: &str,
        label: &'static str,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(concat!("mars-design-site/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building content HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            space_id: cfg.space_id.clone(),
            environment: cfg.environment.clone(),
            access_token: token.to_string(),
            label,
        })
    }

    fn entries_url(&self) -> String {
        format!(
            "{}/spaces/{}/environments/{}/entries",
            self.base_url, self.space_id, self.environment
        )
    }
}

#[async_trait]
impl ContentSource for ContentfulClient {
    async fn entries(&self, kind: ContentKind) -> Result<Vec<Value>, ContentError> {
        let limit = PAGE_LIMIT.to_string();
        let include = INCLUDE_DEPTH.to_string();
        let resp = self
            .http
            .get(self.entries_url())
            .bearer_auth(&self.access_token)
            .query(&[
                ("content_type", kind.content_type()),
                ("include", include.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(
                target: "content",
                source = self.label,
                kind = %kind,
                status = status.as_u16(),
                "content source rejected query"
            );
            return Err(ContentError::Upstream {
                status: status.as_u16(),
                message: truncate(&body, 300),
            });
        }

        let EntryCollection {
            mut items,
            includes,
        } = resp.json::<EntryCollection>().await?;
        resolve_links(&mut items, &includes, INCLUDE_DEPTH);
        Ok(items)
    }

    fn name(&self) -> &'static str {
        self.label
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

type LinkIndex<'a> = HashMap<(String, String), &'a Value>;

/// Replace `{"sys":{"type":"Link","linkType":"Asset"|"Entry","id":..}}`
/// objects inside each item's `fields` with the matching included record,
/// following nested links up to `depth` levels. Unknown links stay as-is.
pub fn resolve_links(items: &mut [Value], includes: &Includes, depth: u8) {
    let mut index: LinkIndex<'_> = HashMap::new();
    for (link_type, records) in [("Asset", &includes.assets), ("Entry", &includes.entries)] {
        for record in records {
            if let Some(id) = record.pointer("/sys/id").and_then(Value::as_str) {
                index.insert((link_type.to_string(), id.to_string()), record);
            }
        }
    }
    if index.is_empty() {
        return;
    }

    for item in items.iter_mut() {
        if let Some(fields) = item.get_mut("fields") {
            resolve_value(fields, &index, depth);
        }
    }
}

fn link_key(value: &Value) -> Option<(String, String)> {
    let sys = value.get("sys")?;
    if sys.get("type")?.as_str()? != "Link" {
        return None;
    }
    let link_type = sys.get("linkType")?.as_str()?;
    let id = sys.get("id")?.as_str()?;
    Some((link_type.to_string(), id.to_string()))
}

fn resolve_value(value: &mut Value, index: &LinkIndex<'_>, depth: u8) {
    if let Some(key) = link_key(value) {
        if depth == 0 {
            return;
        }
        if let Some(target) = index.get(&key) {
            let mut resolved = (*target).clone();
            if let Some(fields) = resolved.get_mut("fields") {
                resolve_value(fields, index, depth - 1);
            }
            *value = resolved;
        }
        return;
    }

    match value {
        Value::Array(values) => {
            for v in values {
                resolve_value(v, index, depth);
            }
        }
        Value::Object(map) => {
            for (_, v) in map.iter_mut() {
                resolve_value(v, index, depth);
            }
        }
        _ => {}
    }
}
