// src/content/cache.rs
//! Per-kind snapshots of normalized content, regenerated once they are older
//! than the revalidation window.
//!
//! Regenerations are not de-duplicated: two requests that both see a stale
//! snapshot both fetch, and the last writer wins.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::content::source::ContentSource;
use crate::content::{fetch_all, ContentError, JobOpening, Normalized, Project, TeamMember};

/// Default revalidation window (one hour).
pub const DEFAULT_REVALIDATE_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub items: Arc<Vec<T>>,
    pub generated_at: DateTime<Utc>,
}

impl<T> Snapshot<T> {
    fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(items),
            generated_at: Utc::now(),
        }
    }

    pub fn is_fresh(&self, window: Duration, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.generated_at);
        chrono::Duration::from_std(window).is_ok_and(|w| age < w)
    }
}

/// One regenerating slot for a record kind.
pub struct Slot<T> {
    current: RwLock<Option<Snapshot<T>>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }
}

impl<T: Normalized> Slot<T> {
    pub async fn peek(&self) -> Option<Snapshot<T>> {
        self.current.read().await.clone()
    }

    /// Fetch, normalize and store a fresh snapshot.
    pub async fn regenerate(&self, source: &dyn ContentSource) -> Result<Snapshot<T>, ContentError> {
        let items = fetch_all::<T>(source).await?;
        let snap = Snapshot::new(items);
        *self.current.write().await = Some(snap.clone());
        tracing::info!(
            target: "content",
            kind = %T::KIND,
            count = snap.items.len(),
            "regenerated snapshot"
        );
        Ok(snap)
    }

    /// Fresh snapshot if there is one; otherwise regenerate. A failed
    /// regeneration falls back to the stale snapshot when one exists.
    pub async fn get(
        &self,
        source: &dyn ContentSource,
        window: Duration,
    ) -> Result<Snapshot<T>, ContentError> {
        let existing = self.peek().await;
        if let Some(snap) = &existing {
            if snap.is_fresh(window, Utc::now()) {
                return Ok(snap.clone());
            }
        }

        match self.regenerate(source).await {
            Ok(snap) => Ok(snap),
            Err(e) => match existing {
                Some(stale) => {
                    tracing::warn!(
                        target: "content",
                        kind = %T::KIND,
                        error = %e,
                        stale_since = %stale.generated_at,
                        "regeneration failed; serving stale snapshot"
                    );
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }
}

/// Published and draft content access for the page-data endpoints.
pub struct ContentService {
    published: Arc<dyn ContentSource>,
    draft: Option<Arc<dyn ContentSource>>,
    revalidate: Duration,
    team: Slot<TeamMember>,
    jobs: Slot<JobOpening>,
    projects: Slot<Project>,
}

impl ContentService {
    pub fn new(published: Arc<dyn ContentSource>, revalidate: Duration) -> Self {
        Self {
            published,
            draft: None,
            revalidate,
            team: Slot::default(),
            jobs: Slot::default(),
            projects: Slot::default(),
        }
    }

    pub fn with_draft_source(mut self, draft: Arc<dyn ContentSource>) -> Self {
        self.draft = Some(draft);
        self
    }

    pub fn revalidate(&self) -> Duration {
        self.revalidate
    }

    pub fn team(&self) -> &Slot<TeamMember> {
        &self.team
    }

    pub fn jobs(&self) -> &Slot<JobOpening> {
        &self.jobs
    }

    pub fn projects(&self) -> &Slot<Project> {
        &self.projects
    }

    pub async fn published<T: Normalized>(
        &self,
        slot: &Slot<T>,
    ) -> Result<Snapshot<T>, ContentError> {
        slot.get(self.published.as_ref(), self.revalidate).await
    }

    /// Draft view: always fetched, never cached. Uses the preview source when
    /// configured, otherwise the published one.
    pub async fn draft<T: Normalized>(&self) -> Result<Snapshot<T>, ContentError> {
        let source = self.draft.as_ref().unwrap_or(&self.published);
        fetch_all::<T>(source.as_ref()).await.map(Snapshot::new)
    }

    /// Regenerate every kind. Failures are logged and do not stop the others.
    pub async fn regenerate_all(&self) -> usize {
        let source = self.published.as_ref();
        let mut failures = 0;
        if let Err(e) = self.team.regenerate(source).await {
            log_failure("team", &e);
            failures += 1;
        }
        if let Err(e) = self.jobs.regenerate(source).await {
            log_failure("jobs", &e);
            failures += 1;
        }
        if let Err(e) = self.projects.regenerate(source).await {
            log_failure("projects", &e);
            failures += 1;
        }
        failures
    }
}

fn log_failure(page: &str, e: &ContentError) {
    tracing::warn!(target: "content", page, error = %e, kind = e.kind_label(), "regeneration failed");
}
