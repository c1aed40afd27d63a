// src/api.rs
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{FromRequest, Query, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::{any, get},
    Form, Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::content::cache::{ContentService, Slot, Snapshot};
use crate::content::source::{ContentSource, ContentfulClient};
use crate::content::{ContentError, Normalized};
use crate::preview::{redirect_target, PreviewGate};
use crate::relay::smtp::SmtpChannel;
use crate::relay::{ApplicationForm, ContactForm, MailChannel, MailError, Relay};

#[derive(Clone)]
pub struct AppState {
    pub content: Arc<ContentService>,
    pub relay: Arc<Relay>,
    pub preview: PreviewGate,
}

impl AppState {
    pub fn new(content: ContentService, relay: Relay, preview: PreviewGate) -> Self {
        Self {
            content: Arc::new(content),
            relay: Arc::new(relay),
            preview,
        }
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(cfg: &SiteConfig) -> anyhow::Result<Self> {
        let published: Arc<dyn ContentSource> = Arc::new(ContentfulClient::delivery(&cfg.content)?);
        let mut content =
            ContentService::new(published, Duration::from_secs(cfg.revalidate_secs));
        if let Some(preview) = ContentfulClient::preview(&cfg.content)? {
            content = content.with_draft_source(Arc::new(preview));
        }

        let channel: Arc<dyn MailChannel> = Arc::new(SmtpChannel::from_config(&cfg.mail)?);
        let relay = Relay::from_config(channel, &cfg.mail);

        Ok(Self::new(
            content,
            relay,
            PreviewGate::new(cfg.preview.secret.clone()),
        ))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/team", get(team_page))
        .route("/api/careers", get(careers_page))
        .route("/api/projects", get(projects_page))
        .route("/api/contact", any(contact))
        .route("/api/apply", any(apply))
        .route("/api/preview", get(enter_preview))
        .route("/api/exit-preview", get(exit_preview))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ---- page data ----

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageData<T> {
    items: Vec<T>,
    generated_at: String,
    revalidate: u64,
    draft: bool,
}

#[derive(Serialize)]
struct PageError {
    error: String,
    kind: &'static str,
}

impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        tracing::error!(target: "content", error = %self, kind = self.kind_label(), "page generation failed");
        let body = PageError {
            error: self.to_string(),
            kind: self.kind_label(),
        };
        (StatusCode::BAD_GATEWAY, Json(body)).into_response()
    }
}

async fn load<T: Normalized>(
    state: &AppState,
    headers: &HeaderMap,
    slot: &Slot<T>,
) -> Result<(Snapshot<T>, bool), ContentError> {
    if state.preview.is_draft(headers) {
        return state.content.draft::<T>().await.map(|s| (s, true));
    }
    state.content.published(slot).await.map(|s| (s, false))
}

fn page<T: Serialize, U>(
    state: &AppState,
    snap: &Snapshot<U>,
    draft: bool,
    items: Vec<T>,
) -> Json<PageData<T>> {
    Json(PageData {
        items,
        generated_at: snap.generated_at.to_rfc3339(),
        revalidate: state.content.revalidate().as_secs(),
        draft,
    })
}

async fn team_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match load(&state, &headers, state.content.team()).await {
        Ok((snap, draft)) => {
            let items = snap.items.to_vec();
            page(&state, &snap, draft, items).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn careers_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match load(&state, &headers, state.content.jobs()).await {
        Ok((snap, draft)) => {
            let items = snap.items.to_vec();
            page(&state, &snap, draft, items).into_response()
        }
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
struct ProjectsQuery {
    #[serde(default)]
    featured: Option<bool>,
}

async fn projects_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<ProjectsQuery>,
) -> Response {
    match load(&state, &headers, state.content.projects()).await {
        Ok((snap, draft)) => {
            let items = snap
                .items
                .iter()
                .filter(|p| q.featured.map_or(true, |want| p.featured == want))
                .cloned()
                .collect();
            page(&state, &snap, draft, items).into_response()
        }
        Err(e) => e.into_response(),
    }
}

// ---- form relay ----

/// Form body accepted as JSON or as url-encoded form data.
struct Submission<T>(T);

impl<S, T> FromRequest<S> for Submission<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(v) = Json::<T>::from_request(req, state)
                .await
                .map_err(|r| invalid_body(r.status(), r.body_text()))?;
            Ok(Self(v))
        } else {
            let Form(v) = Form::<T>::from_request(req, state)
                .await
                .map_err(|r| invalid_body(r.status(), r.body_text()))?;
            Ok(Self(v))
        }
    }
}

fn invalid_body(status: StatusCode, detail: String) -> Response {
    tracing::warn!(target: "relay", status = status.as_u16(), error = %detail, "unreadable form body");
    (
        status,
        Json(RelayStatus {
            success: false,
            message: "Invalid request body",
            error: Some(detail),
            code: None,
            response_code: None,
        }),
    )
        .into_response()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayStatus {
    success: bool,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_code: Option<u16>,
}

#[derive(Serialize)]
struct StatusMessage {
    message: &'static str,
}

fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(StatusMessage {
            message: "Method not allowed",
        }),
    )
        .into_response()
}

fn relay_outcome(result: Result<(), MailError>, ok: &'static str, failed: &'static str) -> Response {
    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(RelayStatus {
                success: true,
                message: ok,
                error: None,
                code: None,
                response_code: None,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RelayStatus {
                success: false,
                message: failed,
                error: Some(e.message),
                code: e.code,
                response_code: e.response_code,
            }),
        )
            .into_response(),
    }
}

async fn contact(State(state): State<AppState>, req: Request) -> Response {
    if req.method() != Method::POST {
        return method_not_allowed();
    }
    let Submission(form) = match Submission::<ContactForm>::from_request(req, &state).await {
        Ok(s) => s,
        Err(rejection) => return rejection,
    };
    let result = state.relay.send_contact(&form).await;
    relay_outcome(result, "Email sent successfully", "Failed to send email")
}

async fn apply(State(state): State<AppState>, req: Request) -> Response {
    if req.method() != Method::POST {
        return method_not_allowed();
    }
    let Submission(form) = match Submission::<ApplicationForm>::from_request(req, &state).await {
        Ok(s) => s,
        Err(rejection) => return rejection,
    };
    let result = state.relay.send_application(&form).await;
    relay_outcome(
        result,
        "Application submitted successfully",
        "Failed to submit application",
    )
}

// ---- preview ----

#[derive(Deserialize)]
struct PreviewQuery {
    secret: Option<String>,
    slug: Option<String>,
}

async fn enter_preview(State(state): State<AppState>, Query(q): Query<PreviewQuery>) -> Response {
    let cookie = match state.preview.enable_cookie() {
        Some(cookie) if state.preview.accepts(q.secret.as_deref()) => cookie,
        _ => {
            tracing::warn!(target: "preview", "rejected preview request");
            return (
                StatusCode::UNAUTHORIZED,
                Json(StatusMessage {
                    message: "Invalid token",
                }),
            )
                .into_response();
        }
    };

    let target = redirect_target(q.slug.as_deref());
    tracing::info!(target: "preview", path = target, "draft mode enabled");
    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::temporary(target),
    )
        .into_response()
}

async fn exit_preview() -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, PreviewGate::clear_cookie())]),
        Redirect::temporary("/"),
    )
        .into_response()
}
