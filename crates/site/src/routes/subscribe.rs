//! Interest sign-up and unsubscribe endpoints.
//!
//! Both answer with `{"status", "message"}`, the message ready to show
//! under the form or on the unsubscribe page.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::locale::Locale;
use crate::state::AppState;
use crate::subscriptions::{
    self, SubscribeError, SubscribeForm, UnsubscribeStatus, SUBSCRIBED_MESSAGE,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    Success,
    Error,
}

#[derive(Debug, Serialize)]
pub struct FormState {
    pub status: FormStatus,
    pub message: String,
}

/// POST /api/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    Json(form): Json<SubscribeForm>,
) -> (StatusCode, Json<FormState>) {
    match subscriptions::subscribe(state.subscriptions.as_ref(), &form).await {
        Ok(_) => (
            StatusCode::OK,
            Json(FormState {
                status: FormStatus::Success,
                message: SUBSCRIBED_MESSAGE.to_string(),
            }),
        ),
        Err(err) => {
            let status = match err {
                SubscribeError::InvalidEmail | SubscribeError::MissingInterest => {
                    StatusCode::BAD_REQUEST
                }
                SubscribeError::SaveFailed | SubscribeError::UpdateFailed => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (
                status,
                Json(FormState {
                    status: FormStatus::Error,
                    message: err.to_string(),
                }),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeQuery {
    pub token: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UnsubscribeResponse {
    pub status: UnsubscribeStatus,
    pub message: &'static str,
}

/// GET /api/unsubscribe?token=...&locale=en
pub async fn unsubscribe(
    State(state): State<AppState>,
    Query(query): Query<UnsubscribeQuery>,
) -> (StatusCode, Json<UnsubscribeResponse>) {
    let locale = Locale::normalize(query.locale.as_deref());
    let status = subscriptions::unsubscribe(state.subscriptions.as_ref(), query.token.as_deref()).await;
    let code = match status {
        UnsubscribeStatus::Success => StatusCode::OK,
        UnsubscribeStatus::Invalid => StatusCode::BAD_REQUEST,
        UnsubscribeStatus::Expired => StatusCode::NOT_FOUND,
        UnsubscribeStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        code,
        Json(UnsubscribeResponse {
            status,
            message: status.message(locale),
        }),
    )
}
