//! Pilot-only download of the Studio build.

use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::pilots::validate_pilot_access;
use crate::session::session_cookie;
use crate::state::AppState;

pub const PLACEHOLDER_BODY: &str =
    "Dette er en placeholder for Y-Link Studio. Kontakt Y-Link for full build.";
pub const DOWNLOAD_FILENAME: &str = "y-link-studio.txt";

/// GET /api/download
///
/// Requires a valid `pilot_session` cookie whose email still has pilot access.
pub async fn download(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let now = Utc::now();

    let token = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(session_cookie)
        .ok_or(AppError::Unauthorized)?;

    let session = state
        .sessions
        .decode(token, now.timestamp_millis())
        .ok_or(AppError::Unauthorized)?;
    if session.email.trim().is_empty() {
        return Err(AppError::Unauthorized);
    }

    let access = validate_pilot_access(state.pilots.as_ref(), &session.email, now)
        .await
        .map_err(|denied| {
            log::info!("Download denied for {}: {}", session.email, denied);
            AppError::Unauthorized
        })?;
    log::info!(
        "Serving download to {} ({})",
        session.email,
        access.pilot_type.as_deref().unwrap_or("pilot")
    );

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME),
            ),
            (CACHE_CONTROL, "no-store".to_string()),
        ],
        PLACEHOLDER_BODY,
    )
        .into_response())
}
