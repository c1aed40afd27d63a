// src/content/normalize.rs
//! Normalization rules: typed raw entries → presentation records.
//!
//! Nothing here fails. Every output field has a concrete value, falling back
//! to an empty string, an empty list, `false`, or a kind-specific default.

use serde_json::Value;

use crate::content::raw::{
    AssetRef, GeoPoint, JobOpeningFields, ListField, LocationField, ProjectFields, RawEntry,
    TeamMemberFields,
};
use crate::content::{JobOpening, Project, SocialLinks, TeamMember};

pub const TEAM_PLACEHOLDER_IMAGE: &str = "https://images.unsplash.com/photo-1573496359142-b8d87734a5a2?ixlib=rb-1.2.1&auto=format&fit=crop&w=800&q=80";
pub const PROJECT_PLACEHOLDER_IMAGE: &str = "https://images.unsplash.com/photo-1600210492493-0946911123ea?ixlib=rb-1.2.1&auto=format&fit=crop&w=800&q=80";

pub const JOB_LOCATION_FALLBACK: &str = "Remote";
pub const PROJECT_LOCATION_FALLBACK: &str = "Location Unavailable";

/// Prefix protocol-relative URLs (`//host/path`) with `https:`.
pub fn https_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

/// File URL of an asset, protocol-normalized; empty when the asset has none.
pub fn asset_url(asset: Option<&AssetRef>) -> String {
    asset
        .and_then(AssetRef::file_url)
        .map(https_url)
        .unwrap_or_default()
}

/// Pick the first present candidate and resolve its URL, falling back to
/// `placeholder` when the chosen asset exposes no file URL.
///
/// A present-but-empty primary asset does not fall through to the secondary.
pub fn resolve_image(candidates: &[Option<&AssetRef>], placeholder: &str) -> String {
    let chosen = candidates.iter().copied().flatten().next();
    let url = asset_url(chosen);
    if url.is_empty() {
        placeholder.to_string()
    } else {
        url
    }
}

/// Split newline-delimited text into trimmed, non-empty lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn coerce_list(field: Option<&ListField>) -> Vec<String> {
    match field {
        Some(ListField::Items(items)) => items.clone(),
        Some(ListField::Text(text)) => split_lines(text),
        None => Vec::new(),
    }
}

/// Resolve a location field. For geo points the first non-empty override
/// wins, then `fallback`. A point with a zero coordinate counts as no
/// location at all.
pub fn resolve_location(
    field: Option<&LocationField>,
    overrides: &[Option<&str>],
    fallback: &str,
) -> String {
    match field {
        Some(LocationField::Text(text)) => text.clone(),
        Some(LocationField::Geo(GeoPoint { lat, lon })) if *lat != 0.0 && *lon != 0.0 => {
            overrides
                .iter()
                .copied()
                .flatten()
                .find(|s| !s.is_empty())
                .unwrap_or(fallback)
                .to_string()
        }
        Some(LocationField::Geo(_)) | Some(LocationField::Object(_)) | None => String::new(),
    }
}

/// Truthiness: `null`, `false`, `0`, `NaN` and `""` are false; everything
/// else, including empty arrays and objects, is true.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

pub fn team_member(entry: RawEntry<TeamMemberFields>) -> TeamMember {
    let f = entry.fields;
    let image = resolve_image(
        &[f.profile_image.as_ref(), f.image.as_ref()],
        TEAM_PLACEHOLDER_IMAGE,
    );
    let social = f.social.unwrap_or_default();

    TeamMember {
        id: entry.sys.id,
        name: f.name.unwrap_or_default(),
        role: f.role.unwrap_or_default(),
        bio: f.bio.unwrap_or_default(),
        image,
        social: SocialLinks {
            linkedin: social.linkedin.unwrap_or_default(),
            email: social.email.unwrap_or_default(),
            instagram: social.instagram.unwrap_or_default(),
        },
        specialties: f.specialties,
    }
}

pub fn job_opening(entry: RawEntry<JobOpeningFields>) -> JobOpening {
    let f = entry.fields;
    let location = resolve_location(
        f.location.as_ref(),
        &[f.location_name.as_deref()],
        JOB_LOCATION_FALLBACK,
    );

    JobOpening {
        id: entry.sys.id,
        title: f.title.unwrap_or_default(),
        location,
        employment_type: f.employment_type.unwrap_or_default(),
        description: f.description.unwrap_or_default(),
        requirements: coerce_list(f.requirements.as_ref()),
        benefits: coerce_list(f.benefits.as_ref()),
    }
}

pub fn project(entry: RawEntry<ProjectFields>) -> Project {
    let f = entry.fields;
    let location = resolve_location(
        f.location.as_ref(),
        &[f.location_name.as_deref(), f.city.as_deref()],
        PROJECT_LOCATION_FALLBACK,
    );
    let images = f
        .images
        .unwrap_or_default()
        .iter()
        .map(|image| asset_url(image.as_ref()))
        .collect();

    Project {
        id: entry.sys.id,
        title: f.title.unwrap_or_default(),
        category: f.category.unwrap_or_default(),
        description: f.description.unwrap_or_default(),
        location,
        images,
        featured_image: resolve_image(&[f.featured_image.as_ref()], PROJECT_PLACEHOLDER_IMAGE),
        featured: truthy(f.featured.as_ref()),
    }
}
