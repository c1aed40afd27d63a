// src/content/raw.rs
//! Typed view of raw delivery-API entries, after link resolution.
//!
//! Every field is optional: an absent field decodes to its default. A field
//! whose JSON type matches none of the accepted shapes fails decoding so an
//! upstream schema change surfaces instead of rendering blank pages.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::content::Bio;

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "F: Deserialize<'de> + Default"))]
pub struct RawEntry<F> {
    pub sys: EntrySys,
    #[serde(default)]
    pub fields: F,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntrySys {
    pub id: String,
}

/// A (resolved) asset reference. An unresolved link decodes to an asset
/// without fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetRef {
    #[serde(default)]
    pub fields: AssetFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFields {
    #[serde(default)]
    pub file: Option<AssetFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFile {
    #[serde(default)]
    pub url: Option<String>,
}

impl AssetRef {
    pub fn file_url(&self) -> Option<&str> {
        self.fields.file.as_ref()?.url.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Location as stored upstream: a plain string, a geo point, or some other
/// object (which carries no usable location).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LocationField {
    Text(String),
    Geo(GeoPoint),
    Object(Map<String, Value>),
}

/// A list stored either as a real list or as newline-delimited text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListField {
    Items(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocialFields {
    pub linkedin: Option<String>,
    pub email: Option<String>,
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamMemberFields {
    pub name: Option<String>,
    pub role: Option<String>,
    pub bio: Option<Bio>,
    pub profile_image: Option<AssetRef>,
    pub image: Option<AssetRef>,
    pub social: Option<SocialFields>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub specialties: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobOpeningFields {
    pub title: Option<String>,
    pub location: Option<LocationField>,
    pub location_name: Option<String>,
    #[serde(rename = "type")]
    pub employment_type: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<ListField>,
    pub benefits: Option<ListField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectFields {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub location: Option<LocationField>,
    pub location_name: Option<String>,
    pub city: Option<String>,
    pub images: Option<Vec<Option<AssetRef>>>,
    pub featured_image: Option<AssetRef>,
    pub featured: Option<Value>,
}

/// Anything that is not a list becomes an empty list; non-string items are dropped.
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
