#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use ylink_core::ToolSettings;
use ylink_site::config::ServerConfig;
use ylink_site::content::InMemoryContentRepository;
use ylink_site::router::build_app_router;
use ylink_site::session::SessionCodec;
use ylink_site::state::AppState;

pub const TEST_SECRET: &str = "test-session-secret";

/// Posts, series, pilots and sign-ups shared by the HTTP tests.
pub const CONTENT: &str = r#"{
    "posts": [
        {"id": 1, "category": "blog", "translations": [
            {"locale": "nb", "slug": "dmx-grunnlag"},
            {"locale": "en", "slug": "dmx-basics"}
        ]},
        {"id": 2, "category": "blog", "translations": [
            {"locale": "nb", "slug": "bare-norsk"}
        ]},
        {"id": 10, "category": "guide", "seriesId": "setup", "translations": [
            {"locale": "nb", "slug": "koble-til"},
            {"locale": "en", "slug": "connecting"}
        ]},
        {"id": 11, "category": "guide", "translations": [
            {"locale": "nb", "slug": "frittstaende"},
            {"locale": "en", "slug": "standalone"}
        ]},
        {"id": 12, "category": "guide", "seriesId": "norsk-serie", "translations": [
            {"locale": "nb", "slug": "innledning"},
            {"locale": "en", "slug": "introduction"}
        ]}
    ],
    "series": [
        {"id": "setup", "translations": [
            {"locale": "nb", "slug": "oppsett"},
            {"locale": "en", "slug": "setup"}
        ]},
        {"id": "norsk-serie", "translations": [
            {"locale": "nb", "slug": "kun-norsk"}
        ]}
    ],
    "pilots": [
        {"email": "pilot@example.com", "pilotType": "studio"},
        {"email": "paused@example.com", "isActive": false},
        {"email": "lapsed@example.com", "expiresAt": "2020-01-01T00:00:00Z"}
    ],
    "subscriptions": [
        {"email": "lead@example.com", "name": "Ola", "interestType": "Produktoppdateringer",
         "unsubscribeToken": "lead-token"}
    ]
}"#;

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        session_secret: TEST_SECRET.to_string(),
        request_timeout_secs: 30,
    }
}

pub fn test_sessions() -> SessionCodec {
    SessionCodec::new(TEST_SECRET).unwrap()
}

/// The full router over [`CONTENT`] and default tool settings.
pub fn build_test_app() -> Router {
    let config = test_config();
    let content = Arc::new(InMemoryContentRepository::from_json(CONTENT).unwrap());

    let state = AppState {
        content: content.clone(),
        pilots: content.clone(),
        subscriptions: content,
        sessions: test_sessions(),
        tools: Arc::new(ToolSettings::default()),
    };

    build_app_router(state, &config)
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}
