// src/lib.rs
// Public library surface for the binary, tools and integration tests.

pub mod api;
pub mod config;
pub mod content;
pub mod metrics;
pub mod preview;
pub mod relay;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::SiteConfig;
pub use crate::content::{ContentError, ContentKind, JobOpening, Project, TeamMember};
pub use crate::relay::{MailChannel, MailError, OutboundMail};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the tracing subscriber.
/// `RUST_LOG` overrides the default filter; `SITE_LOG_JSON=1` switches to JSON lines.
/// Returns `false` when another global subscriber was installed first.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mars_design_site=info,content=info,relay=info,preview=info,warn"));

    let json = std::env::var("SITE_LOG_JSON").ok().is_some_and(|v| v == "1");
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    installed.is_ok()
}
