use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::domain::entities::{ChatWebhookEvent, WebhookOutcome};
use crate::infrastructure::http::middleware::{ApiResult, AppState};

// POST /api/chatwoot-webhook - Inbound chat platform events
pub async fn chatwoot_webhook(
    State(state): State<AppState>,
    payload: Result<Json<ChatWebhookEvent>, JsonRejection>,
) -> ApiResult<Json<WebhookOutcome>> {
    let Json(event) = payload?;
    tracing::debug!(
        "Webhook event={} conversation={:?}",
        event.event,
        event.conversation_id()
    );

    let outcome = state.conversation_service.handle_webhook(&event).await?;
    Ok(Json(outcome))
}
