use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;

use crate::domain::entities::TrackBotMessageRequest;
use crate::infrastructure::http::middleware::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackBotMessageResponse {
    pub success: bool,
    pub conversation_id: i64,
}

// POST /api/track-bot-message - Remember an externally sent bot message
pub async fn track_bot_message(
    State(state): State<AppState>,
    payload: Result<Json<TrackBotMessageRequest>, JsonRejection>,
) -> ApiResult<Json<TrackBotMessageResponse>> {
    let Json(req) = payload?;
    let conversation_id = req
        .conversation_id
        .ok_or_else(|| ApiError::BadRequest("conversationId is required".to_string()))?;
    let message_id = req.message_id();
    let content = req
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("content is required".to_string()))?;

    state
        .conversation_service
        .track_bot_message(conversation_id, &content, message_id.as_deref())
        .await;

    Ok(Json(TrackBotMessageResponse {
        success: true,
        conversation_id,
    }))
}
