// src/content/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::task::JoinHandle;

use crate::content::cache::ContentService;

/// Spawn the wall-clock regeneration loop. The first tick fires immediately,
/// warming every snapshot at startup.
pub fn spawn_regeneration(service: Arc<ContentService>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let failures = service.regenerate_all().await;

            let now = chrono::Utc::now().timestamp().max(0) as u64;
            counter!("content_regeneration_runs_total").increment(1);
            gauge!("content_regeneration_last_run_ts").set(now as f64);

            tracing::info!(target: "content", failures, "regeneration tick");
        }
    })
}
