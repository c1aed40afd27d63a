// tests/api_relay.rs
//
// HTTP-level tests for the form relay endpoints, driven through the router
// with tower::ServiceExt::oneshot and an in-memory mail channel.

mod common;

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt as _;

use common::{harness, json_body, FakeChannel, FakeSource};
use mars_design_site::{api, MailError};

const HOUR: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn non_post_is_rejected_without_sending() {
    for (method, uri) in [("GET", "/api/contact"), ("PUT", "/api/apply"), ("DELETE", "/api/contact")] {
        let h = harness(FakeSource::default(), FakeChannel::default(), HOUR);
        let app = api::router(h.state.clone());

        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("build request");
        let resp = app.oneshot(req).await.expect("oneshot");

        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        let v = json_body(resp).await;
        assert_eq!(v["message"], "Method not allowed");
        assert!(h.channel.sent().is_empty(), "no send attempt for {method}");
    }
}

#[tokio::test]
async fn contact_json_is_relayed_to_contact_mailbox() {
    let h = harness(FakeSource::default(), FakeChannel::default(), HOUR);
    let app = api::router(h.state.clone());

    let payload = json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "subject": "Kitchen remodel",
        "message": "Hi there\nWe need help"
    });
    let req = Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /api/contact");

    let resp = app.oneshot(req).await.expect("oneshot");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["message"], "Email sent successfully");

    let sent = h.channel.sent();
    assert_eq!(sent.len(), 1);
    let mail = &sent[0];
    assert_eq!(mail.from, "\"MARS Design Website\" <studio@example.com>");
    assert_eq!(mail.to, "hello@example.com");
    assert_eq!(mail.reply_to.as_deref(), Some("ada@example.com"));
    assert_eq!(mail.subject, "Contact Form: Kitchen remodel");
    assert!(mail.html.contains("<p>Hi there<br>We need help</p>"));
    assert!(mail.html.contains("<p><strong>Phone:</strong> Not provided</p>"));
}

#[tokio::test]
async fn application_form_encoding_is_accepted() {
    let h = harness(FakeSource::default(), FakeChannel::default(), HOUR);
    let app = api::router(h.state.clone());

    let body = "fullName=Bo+Chen&email=bo%40example.com&position=Junior+Designer&portfolio=https%3A%2F%2Fbo.design&message=Hello";
    let req = Request::builder()
        .method("POST")
        .uri("/api/apply")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("build POST /api/apply");

    let resp = app.oneshot(req).await.expect("oneshot");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert_eq!(v["message"], "Application submitted successfully");

    let sent = h.channel.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "careers@example.com");
    assert_eq!(sent[0].from, "\"MARS Design Careers\" <studio@example.com>");
    assert_eq!(sent[0].subject, "Job Application: Junior Designer");
    assert!(sent[0].html.contains("<p><strong>Name:</strong> Bo Chen</p>"));
    assert!(sent[0]
        .html
        .contains("<p><strong>Portfolio URL:</strong> https://bo.design</p>"));
}

#[tokio::test]
async fn channel_failure_yields_500_with_error_code() {
    let err = MailError::new("EAUTH", "Invalid login: 535 5.7.8 Username and Password not accepted")
        .with_response_code(535);
    let h = harness(FakeSource::default(), FakeChannel::failing(err), HOUR);
    let app = api::router(h.state.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/api/apply")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"fullName":"Cy","email":"cy@example.com"}"#))
        .expect("build POST /api/apply");

    let resp = app.oneshot(req).await.expect("oneshot");
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let v = json_body(resp).await;
    assert_eq!(v["success"], false);
    assert_eq!(v["message"], "Failed to submit application");
    assert_eq!(v["code"], "EAUTH");
    assert_eq!(v["responseCode"], 535);
    assert!(v["error"].as_str().unwrap_or_default().contains("Invalid login"));
    // exactly one attempt, no retry
    assert_eq!(h.channel.sent().len(), 1);
}

#[tokio::test]
async fn contact_failure_reports_generic_message() {
    let err = MailError::new("ECONNECTION", "connection refused");
    let h = harness(FakeSource::default(), FakeChannel::failing(err), HOUR);
    let app = api::router(h.state.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"name":"Dee"}"#))
        .expect("build POST /api/contact");

    let resp = app.oneshot(req).await.expect("oneshot");
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let v = json_body(resp).await;
    assert_eq!(v["message"], "Failed to send email");
    assert_eq!(v["code"], "ECONNECTION");
    assert!(v.get("responseCode").is_none());
}

#[tokio::test]
async fn null_and_numeric_fields_are_relayed() {
    for (phone, shown) in [(json!(null), "Not provided"), (json!(5551234), "5551234")] {
        let h = harness(FakeSource::default(), FakeChannel::default(), HOUR);
        let app = api::router(h.state.clone());

        let payload = json!({
            "name": "A",
            "email": "a@x.com",
            "phone": phone,
            "message": "hi"
        });
        let req = Request::builder()
            .method("POST")
            .uri("/api/contact")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("build POST /api/contact");

        let resp = app.oneshot(req).await.expect("oneshot");
        assert_eq!(resp.status(), StatusCode::OK, "phone = {phone}");

        let sent = h.channel.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0]
            .html
            .contains(&format!("<p><strong>Phone:</strong> {shown}</p>")));
    }
}

#[tokio::test]
async fn malformed_body_gets_json_status() {
    let h = harness(FakeSource::default(), FakeChannel::default(), HOUR);
    let app = api::router(h.state.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("build POST /api/contact");

    let resp = app.oneshot(req).await.expect("oneshot");
    assert!(resp.status().is_client_error());
    let v = json_body(resp).await;
    assert_eq!(v["success"], false);
    assert_eq!(v["message"], "Invalid request body");
    assert!(h.channel.sent().is_empty());
}
