use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::domain::entities::{BrokerDirectoryEntry, ConversationBrokerResponse, ManualAssignmentRequest};
use crate::infrastructure::http::middleware::{ApiError, ApiResult, AppState};

// GET /api/brokers - Active broker directory
pub async fn list_brokers(State(state): State<AppState>) -> ApiResult<Json<Vec<BrokerDirectoryEntry>>> {
    let brokers = state.assignment_service.list_brokers().await?;
    Ok(Json(brokers))
}

// GET /api/brokers/conversation/:id - Broker assigned to a conversation
pub async fn get_conversation_broker(
    State(state): State<AppState>,
    Path(conversation_id): Path<i64>,
) -> ApiResult<Json<ConversationBrokerResponse>> {
    let response = state
        .assignment_service
        .broker_for_conversation(conversation_id)
        .await?;
    Ok(Json(response))
}

// POST /api/brokers/conversation/:id/assign - Manual assignment or reassignment
pub async fn assign_conversation_broker(
    State(state): State<AppState>,
    Path(conversation_id): Path<i64>,
    payload: Result<Json<ManualAssignmentRequest>, JsonRejection>,
) -> ApiResult<Json<ConversationBrokerResponse>> {
    let Json(req) = payload?;
    let broker_id = req
        .broker_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("brokerId is required".to_string()))?;

    let response = state
        .assignment_service
        .assign_manually(conversation_id, &broker_id, req.reason)
        .await?;
    Ok(Json(response))
}
