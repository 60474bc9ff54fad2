use std::sync::Arc;

use ylink_core::ToolSettings;

use crate::content::{ContentRepository, PilotRepository};
use crate::session::SessionCodec;
use crate::subscriptions::SubscriptionRepository;

/// Shared state handed to every handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Post and series slugs for the language switcher.
    pub content: Arc<dyn ContentRepository>,
    pub pilots: Arc<dyn PilotRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    /// Verifies `pilot_session` cookies.
    pub sessions: SessionCodec,
    /// Calculator defaults and input limits loaded at startup.
    pub tools: Arc<ToolSettings>,
}
