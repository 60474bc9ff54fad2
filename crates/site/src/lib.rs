//! Y-Link site backend.
//!
//! Serves the DMX calculators from `ylink-core` over HTTP, together with the
//! pilot-only download, interest sign-ups and the language switcher's route
//! lookup. The binary
//! in `main.rs` and the integration tests both build the app through
//! [`router::build_app_router`].

pub mod config;
pub mod content;
pub mod error;
pub mod locale;
pub mod pilots;
pub mod router;
pub mod routes;
pub mod session;
pub mod state;
pub mod subscriptions;
