//! Fetches every content kind once and prints the normalized records as JSON.
//! Useful as a dry run of page generation against a real space.

use std::sync::Arc;

use mars_design_site::content::fetch_all;
use mars_design_site::content::source::{ContentSource, ContentfulClient};
use mars_design_site::{JobOpening, Project, SiteConfig, TeamMember};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = SiteConfig::load_default()?;
    let draft = std::env::args().any(|a| a == "--draft");
    let source: Arc<dyn ContentSource> = match ContentfulClient::preview(&cfg.content)? {
        Some(preview) if draft => Arc::new(preview),
        _ => Arc::new(ContentfulClient::delivery(&cfg.content)?),
    };

    let team = fetch_all::<TeamMember>(source.as_ref()).await?;
    let jobs = fetch_all::<JobOpening>(source.as_ref()).await?;
    let projects = fetch_all::<Project>(source.as_ref()).await?;

    let out = serde_json::json!({
        "source": source.name(),
        "team": team,
        "careers": jobs,
        "projects": projects,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
