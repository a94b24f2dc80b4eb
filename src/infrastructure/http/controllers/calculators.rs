use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};

use crate::domain::services::calculator::{
    self, LoanInputs, MaxLoanAssessment, MonthlyPayment, StampDuty,
};
use crate::infrastructure::http::middleware::ApiResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPaymentRequest {
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub tenure_years: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityResponse {
    #[serde(flatten)]
    pub assessment: MaxLoanAssessment,
    pub stamp_duty_breakdown: StampDuty,
}

// POST /api/calculators/monthly-payment
pub async fn monthly_payment(
    payload: Result<Json<MonthlyPaymentRequest>, JsonRejection>,
) -> ApiResult<Json<MonthlyPayment>> {
    let Json(req) = payload?;
    let result = calculator::monthly_payment(req.loan_amount, req.interest_rate, req.tenure_years)?;
    Ok(Json(result))
}

// POST /api/calculators/affordability - Maximum loan under MAS limits
pub async fn affordability(
    payload: Result<Json<LoanInputs>, JsonRejection>,
) -> ApiResult<Json<AffordabilityResponse>> {
    let Json(inputs) = payload?;
    let assessment = calculator::max_loan(&inputs)?;
    let stamp_duty_breakdown = calculator::stamp_duty(
        inputs.property_price,
        inputs.citizenship,
        inputs.property_count.max(1),
        inputs.property_type,
    )?;

    Ok(Json(AffordabilityResponse {
        assessment,
        stamp_duty_breakdown,
    }))
}
