use axum::{extract::rejection::JsonRejection, Json};

use crate::domain::services::conversion::{detect, ConversionAssessment, ConversionSignals};
use crate::infrastructure::http::middleware::{ApiError, ApiResult};

// POST /api/detect-conversion - Should this conversation go to a human broker?
pub async fn detect_conversion(
    payload: Result<Json<ConversionSignals>, JsonRejection>,
) -> ApiResult<Json<ConversionAssessment>> {
    let Json(signals) = payload?;
    if signals.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message is required".to_string()));
    }

    let assessment = detect(&signals);
    if assessment.should_transfer {
        metrics::counter!("conversion_transfers_recommended_total").increment(1);
    }
    Ok(Json(assessment))
}
