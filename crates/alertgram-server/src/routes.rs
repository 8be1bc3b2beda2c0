//! Route configuration for the bridge API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers::{health_check, notify_alert, telegram_webhook};
use crate::state::BridgeState;

/// Create the bridge API router.
pub fn create_router(state: Arc<BridgeState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        // Outbound: alert events from the platform
        .route("/alerts/notify", post(notify_alert))
        // Inbound: button presses from Telegram
        .route("/webhooks/telegram", post(telegram_webhook));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
