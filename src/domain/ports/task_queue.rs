use crate::domain::entities::{Job, QueueMetrics};
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn enqueue_at(
        &self,
        job_type: &str,
        payload: Value,
        run_at: DateTime<Utc>,
        priority: i32,
        max_attempts: i32,
    ) -> ApiResult<String>;
    /// Claim the next runnable job, lowest priority value first
    async fn fetch_next_job(&self) -> ApiResult<Option<Job>>;
    async fn complete_job(&self, job_id: &str) -> ApiResult<()>;
    /// Record a failed attempt; reschedules with backoff until attempts are exhausted
    async fn fail_job(&self, job_id: &str, error: &str) -> ApiResult<()>;
    async fn get_job(&self, job_id: &str) -> ApiResult<Option<Job>>;
    /// Whether a pending or processing job of this type exists
    async fn has_outstanding_job(&self, job_type: &str) -> ApiResult<bool>;
    async fn metrics(&self) -> ApiResult<QueueMetrics>;
}
