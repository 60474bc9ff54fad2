//! Application router shared by the binary and the integration tests.

use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Build the full [`Router`]: `/health` at the root, everything else under
/// `/api`, wrapped in a request timeout and panic recovery.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_routes())
        // Panic recovery: catch panics and return 500.
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .with_state(state)
}
