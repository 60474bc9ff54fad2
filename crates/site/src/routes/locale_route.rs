use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::locale::resolve_locale_route;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LocaleRouteQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LocaleRouteResponse {
    pub path: String,
}

/// GET /api/locale-route?from=nb&to=en&path=/blog/hei
pub async fn locale_route(
    State(state): State<AppState>,
    Query(query): Query<LocaleRouteQuery>,
) -> Json<LocaleRouteResponse> {
    let path = resolve_locale_route(
        state.content.as_ref(),
        query.from.as_deref(),
        query.to.as_deref(),
        query.path.as_deref(),
    )
    .await;
    Json(LocaleRouteResponse { path })
}
