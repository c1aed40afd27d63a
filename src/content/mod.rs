// src/content/mod.rs
//! Content layer: typed decoding of raw content-repository entries and the
//! presentation-ready records the site pages consume.

pub mod cache;
pub mod normalize;
pub mod raw;
pub mod scheduler;
pub mod source;

use std::fmt;

use metrics::{counter, histogram};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::raw::{JobOpeningFields, ProjectFields, RawEntry, TeamMemberFields};
use crate::content::source::ContentSource;

/// The three record kinds the site reads from the content repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    TeamMember,
    JobOpening,
    Project,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [
        ContentKind::TeamMember,
        ContentKind::JobOpening,
        ContentKind::Project,
    ];

    /// Content type id used by the delivery API.
    pub fn content_type(self) -> &'static str {
        match self {
            ContentKind::TeamMember => "teamMember",
            ContentKind::JobOpening => "jobOpening",
            ContentKind::Project => "project",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("content source returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("malformed {kind} entry '{id}': {source}")]
    Decode {
        kind: ContentKind,
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ContentError {
    /// Short label used in logs, metrics and error bodies.
    pub fn kind_label(&self) -> &'static str {
        match self {
            ContentError::Fetch(_) => "fetch",
            ContentError::Upstream { .. } => "upstream",
            ContentError::Decode { .. } => "decode",
        }
    }
}

/// Biography text: either a plain string or a rich-text document passed
/// through untouched for the presentation layer to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bio {
    Plain(String),
    Rich(serde_json::Map<String, Value>),
}

impl Default for Bio {
    fn default() -> Self {
        Bio::Plain(String::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub linkedin: String,
    pub email: String,
    pub instagram: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: String,
    pub bio: Bio,
    pub image: String,
    pub social: SocialLinks,
    pub specialties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOpening {
    pub id: String,
    pub title: String,
    pub location: String,
    #[serde(rename = "type")]
    pub employment_type: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub location: String,
    pub images: Vec<String>,
    pub featured_image: String,
    pub featured: bool,
}

/// A presentation record produced from one typed raw entry.
pub trait Normalized: Clone + Send + Sync + 'static {
    const KIND: ContentKind;
    type Fields: DeserializeOwned + Default;

    fn normalize(entry: RawEntry<Self::Fields>) -> Self;
}

impl Normalized for TeamMember {
    const KIND: ContentKind = ContentKind::TeamMember;
    type Fields = TeamMemberFields;

    fn normalize(entry: RawEntry<Self::Fields>) -> Self {
        normalize::team_member(entry)
    }
}

impl Normalized for JobOpening {
    const KIND: ContentKind = ContentKind::JobOpening;
    type Fields = JobOpeningFields;

    fn normalize(entry: RawEntry<Self::Fields>) -> Self {
        normalize::job_opening(entry)
    }
}

impl Normalized for Project {
    const KIND: ContentKind = ContentKind::Project;
    type Fields = ProjectFields;

    fn normalize(entry: RawEntry<Self::Fields>) -> Self {
        normalize::project(entry)
    }
}

/// Decode raw field bags into typed entries and normalize them.
/// The first entry that does not fit the schema aborts the whole batch.
pub fn decode_entries<T: Normalized>(items: Vec<Value>) -> Result<Vec<T>, ContentError> {
    items
        .into_iter()
        .map(|item| {
            let id = entry_id(&item);
            serde_json::from_value::<RawEntry<T::Fields>>(item)
                .map(T::normalize)
                .map_err(|source| ContentError::Decode {
                    kind: T::KIND,
                    id,
                    source,
                })
        })
        .collect()
}

fn entry_id(item: &Value) -> String {
    item.pointer("/sys/id")
        .and_then(Value::as_str)
        .unwrap_or("<unknown>")
        .to_string()
}

/// Fetch every entry of `T::KIND` from `source` and normalize it.
pub async fn fetch_all<T: Normalized>(source: &dyn ContentSource) -> Result<Vec<T>, ContentError> {
    crate::metrics::ensure_described();
    let t0 = std::time::Instant::now();

    let result = match source.entries(T::KIND).await {
        Ok(items) => decode_entries::<T>(items),
        Err(e) => Err(e),
    };

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("content_fetch_ms", "kind" => T::KIND.content_type()).record(ms);

    match &result {
        Ok(items) => {
            counter!("content_fetch_total", "kind" => T::KIND.content_type()).increment(1);
            tracing::debug!(
                target: "content",
                kind = %T::KIND,
                source = source.name(),
                count = items.len(),
                "normalized entries"
            );
        }
        Err(e) => {
            counter!(
                "content_fetch_errors_total",
                "kind" => T::KIND.content_type(),
                "error" => e.kind_label()
            )
            .increment(1);
        }
    }
    result
}
