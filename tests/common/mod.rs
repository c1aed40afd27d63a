// tests/common/mod.rs
// Shared in-memory collaborators for the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::Response;
use serde_json::Value;

use mars_design_site::content::cache::ContentService;
use mars_design_site::content::source::ContentSource;
use mars_design_site::preview::PreviewGate;
use mars_design_site::relay::Relay;
use mars_design_site::{AppState, ContentError, ContentKind, MailChannel, MailError, OutboundMail};

pub const BODY_LIMIT: usize = 1024 * 1024;

/// Content source serving canned items per kind; can be switched to fail.
#[derive(Default)]
pub struct FakeSource {
    items: Mutex<HashMap<ContentKind, Vec<Value>>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn with(kind: ContentKind, items: Vec<Value>) -> Self {
        let src = Self::default();
        src.set(kind, items);
        src
    }

    pub fn set(&self, kind: ContentKind, items: Vec<Value>) {
        self.items.lock().unwrap().insert(kind, items);
    }

    pub fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn entries(&self, kind: ContentKind) -> Result<Vec<Value>, ContentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ContentError::Upstream {
                status: 503,
                message: "space unavailable".into(),
            });
        }
        Ok(self
            .items
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Mail channel recording every send; optionally fails with a fixed error.
#[derive(Default)]
pub struct FakeChannel {
    pub sent: Mutex<Vec<OutboundMail>>,
    pub failure: Option<MailError>,
}

impl FakeChannel {
    pub fn failing(err: MailError) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(err),
        }
    }

    pub fn sent(&self) -> Vec<OutboundMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailChannel for FakeChannel {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

pub struct Harness {
    pub state: AppState,
    pub source: Arc<FakeSource>,
    pub draft: Arc<FakeSource>,
    pub channel: Arc<FakeChannel>,
}

pub fn harness(source: FakeSource, channel: FakeChannel, revalidate: Duration) -> Harness {
    let source = Arc::new(source);
    let draft = Arc::new(FakeSource::default());
    let channel = Arc::new(channel);

    let content = ContentService::new(source.clone(), revalidate).with_draft_source(draft.clone());
    let relay = Relay::new(
        channel.clone(),
        "studio@example.com",
        "hello@example.com",
        "careers@example.com",
    );
    let state = AppState::new(content, relay, PreviewGate::new(Some("let-me-in".into())));

    Harness {
        state,
        source,
        draft,
        channel,
    }
}

pub async fn json_body(resp: Response<Body>) -> Value {
    let bytes = to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json body")
}
