//! MARS Design site backend — Binary Entrypoint
//! Boots the Axum HTTP server: page data, form relay, preview mode and metrics.

use std::sync::Arc;
use std::time::Duration;

use mars_design_site::content::scheduler::spawn_regeneration;
use mars_design_site::metrics::Metrics;
use mars_design_site::{api, init_tracing, AppState, SiteConfig};
use shuttle_axum::ShuttleAxum;
use tracing::info;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    if !init_tracing() {
        eprintln!("tracing subscriber already installed; RUST_LOG/SITE_LOG_JSON ignored");
    }

    let cfg = SiteConfig::load_default()?;
    let metrics = Metrics::init(cfg.revalidate_secs)?;

    let state = AppState::from_config(&cfg)?;
    spawn_regeneration(
        Arc::clone(&state.content),
        Duration::from_secs(cfg.revalidate_secs),
    );

    info!(
        revalidate_secs = cfg.revalidate_secs,
        preview = cfg.preview.secret.is_some(),
        "site backend ready"
    );

    let router = api::router(state).merge(metrics.router());
    Ok(router.into())
}
