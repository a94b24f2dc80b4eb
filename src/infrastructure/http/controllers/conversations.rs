use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::domain::entities::{
    CompletionResponse, ConversationResponse, CreateConversationRequest, LeadAcceptedResponse,
};
use crate::infrastructure::http::middleware::{ApiResult, AppState};

// POST /api/conversations - Lead form submission; assignment happens in the background
pub async fn create_conversation(
    State(state): State<AppState>,
    payload: Result<Json<CreateConversationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<LeadAcceptedResponse>)> {
    let Json(req) = payload?;
    let accepted = state.conversation_service.submit_lead(req).await?;
    Ok((StatusCode::ACCEPTED, Json(accepted)))
}

// GET /api/conversations/:id - Conversation status
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<i64>,
) -> ApiResult<Json<ConversationResponse>> {
    let conversation = state
        .conversation_service
        .get_conversation(conversation_id)
        .await?;
    Ok(Json(ConversationResponse::from(conversation)))
}

// POST /api/conversations/:id/complete - Complete and release the broker
pub async fn complete_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<i64>,
) -> ApiResult<Json<CompletionResponse>> {
    let response = state
        .assignment_service
        .complete_conversation(conversation_id)
        .await?;
    Ok(Json(response))
}
