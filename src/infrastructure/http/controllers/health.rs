use axum::{extract::State, Json};
use serde::Serialize;

use crate::domain::entities::QueueMetrics;
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use crate::infrastructure::workers::WorkerStatus;
use crate::shared::utils::now_timestamp;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub worker: WorkerStatus,
    pub queue: QueueMetrics,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStartResponse {
    pub success: bool,
    pub worker: WorkerStatus,
}

// GET /api/health - Health check; lazily starts the job worker
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let worker = state.worker_manager.ensure_started().await;
    let queue = state.task_queue.metrics().await?;

    Ok(Json(HealthResponse {
        status: "ok",
        timestamp: now_timestamp(),
        worker,
        queue,
    }))
}

// POST /api/worker/start - Start the job worker if it is not running
pub async fn start_worker(State(state): State<AppState>) -> ApiResult<Json<WorkerStartResponse>> {
    let worker = state.worker_manager.ensure_started().await;

    Ok(Json(WorkerStartResponse {
        success: worker.running,
        worker,
    }))
}
