// src/metrics.rs
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and publish the configured revalidation window.
    pub fn init(revalidate_secs: u64) -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        ensure_described();
        gauge!("content_revalidate_secs").set(revalidate_secs as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("content_fetch_total", "Successful content fetches, by kind.");
        describe_counter!(
            "content_fetch_errors_total",
            "Content fetches that failed, by kind and error class."
        );
        describe_histogram!("content_fetch_ms", "Fetch + normalize time in milliseconds.");
        describe_counter!(
            "content_regeneration_runs_total",
            "Scheduled regeneration ticks."
        );
        describe_gauge!(
            "content_regeneration_last_run_ts",
            "Unix ts of the last scheduled regeneration."
        );
        describe_gauge!("content_revalidate_secs", "Configured revalidation window.");
        describe_counter!("relay_sent_total", "Form submissions relayed, by form.");
        describe_counter!("relay_failures_total", "Form relays the mail channel rejected.");
    });
}
