//! Integration tests for the pilot-gated download.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use common::{body_json, body_text, header, send, test_sessions};
use ylink_site::session::{Role, SessionData, COOKIE_NAME};

fn download_request(cookie: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/download");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn cookie_for(email: &str) -> String {
    let token = test_sessions().issue(email, None, Role::Pilot, Utc::now().timestamp_millis());
    format!("theme=dark; {}={}", COOKIE_NAME, token)
}

async fn assert_unauthorized(cookie: Option<String>) {
    let response = send(common::build_test_app(), download_request(cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Unauthorized");
}

#[tokio::test]
async fn active_pilot_gets_the_placeholder() {
    let response = send(
        common::build_test_app(),
        download_request(Some(cookie_for("Pilot@Example.com"))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header(&response, "content-type").starts_with("text/plain"));
    assert_eq!(
        header(&response, "content-disposition"),
        "attachment; filename=\"y-link-studio.txt\""
    );
    assert_eq!(header(&response, "cache-control"), "no-store");
    assert_eq!(
        body_text(response).await,
        "Dette er en placeholder for Y-Link Studio. Kontakt Y-Link for full build."
    );
}

#[tokio::test]
async fn missing_cookie_is_unauthorized() {
    assert_unauthorized(None).await;
    assert_unauthorized(Some("theme=dark".to_string())).await;
}

#[tokio::test]
async fn forged_or_expired_cookie_is_unauthorized() {
    assert_unauthorized(Some(format!("{}=not.valid", COOKIE_NAME))).await;

    let other = ylink_site::session::SessionCodec::new("another-secret").unwrap();
    let forged = other.issue("pilot@example.com", None, Role::Pilot, Utc::now().timestamp_millis());
    assert_unauthorized(Some(format!("{}={}", COOKIE_NAME, forged))).await;

    let now = Utc::now().timestamp_millis();
    let expired = test_sessions().encode(&SessionData {
        email: "pilot@example.com".to_string(),
        pilot_type: None,
        role: Role::Pilot,
        iat: now - 10_000,
        exp: now - 1,
    });
    assert_unauthorized(Some(format!("{}={}", COOKIE_NAME, expired))).await;
}

#[tokio::test]
async fn session_without_pilot_access_is_unauthorized() {
    assert_unauthorized(Some(cookie_for("stranger@example.com"))).await;
    assert_unauthorized(Some(cookie_for("paused@example.com"))).await;
    assert_unauthorized(Some(cookie_for("lapsed@example.com"))).await;
    assert_unauthorized(Some(cookie_for("   "))).await;
}
