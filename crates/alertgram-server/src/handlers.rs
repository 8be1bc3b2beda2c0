//! HTTP request handlers for the bridge API.

use std::sync::Arc;

use alertgram_audit::RequestContext;
use alertgram_core::{Alert, NotifyOutcome, WebhookReply};
use alertgram_telegram::Update;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{ServerError, ServerResult};
use crate::state::BridgeState;

/// Header Telegram uses to echo the webhook secret.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Path of the Telegram webhook endpoint.
pub const WEBHOOK_PATH: &str = "/api/webhooks/telegram";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status message.
    pub status: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
}

/// Handle GET /api/health - health check endpoint.
pub async fn health_check(State(state): State<Arc<BridgeState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Handle POST /api/alerts/notify - push an alert event to the chat.
pub async fn notify_alert(
    State(state): State<Arc<BridgeState>>,
    Json(alert): Json<Alert>,
) -> (StatusCode, Json<NotifyOutcome>) {
    let outcome = state.notifier().notify(&alert).await;
    let status = match &outcome {
        NotifyOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    (status, Json(outcome))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Handle POST /api/webhooks/telegram - apply a button press.
///
/// Telegram redelivers an update until it gets a 2xx, so every handled
/// update answers 200 and carries its outcome in the body. Only a bad secret
/// is refused.
pub async fn telegram_webhook(
    State(state): State<Arc<BridgeState>>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> ServerResult<Json<WebhookReply>> {
    if !state.webhook_authorized(header(&headers, SECRET_HEADER)) {
        warn!(update_id = update.update_id, "webhook with bad secret token");
        return Err(ServerError::Unauthorized(
            "missing or wrong secret token".to_string(),
        ));
    }

    let mut request = RequestContext::new(WEBHOOK_PATH);
    if let Some(addr) = header(&headers, "x-forwarded-for") {
        request = request.with_remote_addr(addr);
    }
    if let Some(agent) = header(&headers, "user-agent") {
        request = request.with_user_agent(agent);
    }

    let reply = match state.callbacks().handle(&update, request).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(update_id = update.update_id, error = %e, "callback failed");
            WebhookReply::error(e.to_string())
        }
    };

    info!(
        update_id = update.update_id,
        status = ?reply.status,
        message = reply.message.as_deref().unwrap_or_default(),
        "webhook handled"
    );
    Ok(Json(reply))
}
