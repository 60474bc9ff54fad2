pub mod download;
pub mod health;
pub mod locale_route;
pub mod subscribe;
pub mod tools;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /download                       pilot-only download (GET)
/// /locale-route                   sibling path in another locale (GET)
/// /subscribe                      interest sign-up (POST)
/// /unsubscribe                    unsubscribe link target (GET)
///
/// /tools/overlap                  overlapping ranges (POST)
/// /tools/next-free                first free run (POST)
/// /tools/address-planner          single-universe layout + handoff (POST)
/// /tools/patch-sheet              rows and warnings (POST)
/// /tools/patch-sheet/csv          CSV attachment (POST)
/// /tools/patch-sheet/labels       label list (POST)
/// /tools/patch-sheet/print        printable HTML (POST)
/// /tools/patch-sheet/import       decode a planner handoff (GET)
/// /tools/color                    colour to channel levels (POST)
/// /tools/capacity                 fixtures per universe (POST)
/// /tools/dip                      address to switches (GET), switches to address (POST)
/// /tools/power                    circuit and phase load (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/download", get(download::download))
        .route("/locale-route", get(locale_route::locale_route))
        .route("/subscribe", post(subscribe::subscribe))
        .route("/unsubscribe", get(subscribe::unsubscribe))
        .nest("/tools", tools::router())
}
