use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{any::AnyRow, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entities::{Job, JobStatus, QueueMetrics};
use crate::domain::ports::task_queue::TaskQueue;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::Database;
use crate::shared::utils::{format_timestamp, parse_timestamp};

const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(2);
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5 * 60);

const JOB_COLUMNS: &str = "id, job_type, payload, status, priority, run_at, created_at, updated_at,
     attempts, max_attempts, last_error";

fn parse_date_col(row: &AnyRow, col: &str) -> ApiResult<DateTime<Utc>> {
    let value: String = row.try_get(col)?;
    parse_timestamp(&value)
        .ok_or_else(|| ApiError::Internal(format!("Invalid timestamp in jobs.{}: {}", col, value)))
}

fn job_from_row(row: &AnyRow) -> ApiResult<Job> {
    let status: String = row.try_get("status")?;
    let payload: String = row.try_get("payload")?;
    let priority: i64 = row.try_get("priority")?;
    let attempts: i64 = row.try_get("attempts")?;
    let max_attempts: i64 = row.try_get("max_attempts")?;

    Ok(Job {
        id: row.try_get("id")?,
        job_type: row.try_get("job_type")?,
        payload: serde_json::from_str(&payload).unwrap_or(Value::Null),
        status: JobStatus::from(status),
        priority: priority as i32,
        run_at: parse_date_col(row, "run_at")?,
        created_at: parse_date_col(row, "created_at")?,
        updated_at: parse_date_col(row, "updated_at")?,
        attempts: attempts as i32,
        max_attempts: max_attempts as i32,
        last_error: row.try_get("last_error")?,
    })
}

/// SQL-backed job queue with priorities, delays and exponential-backoff retries
#[derive(Clone)]
pub struct SqliteTaskQueue {
    db: Database,
    backoff_base: Duration,
    lock_timeout: Duration,
}

impl SqliteTaskQueue {
    pub fn new(db: Database) -> Self {
        Self::with_backoff(db, DEFAULT_BACKOFF_BASE)
    }

    pub fn with_backoff(db: Database, backoff_base: Duration) -> Self {
        Self {
            db,
            backoff_base,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Delay before the retry that follows `attempts` failed attempts
    fn backoff_for(&self, attempts: i32) -> chrono::Duration {
        let exponent = attempts.clamp(0, 16) as u32;
        let delay = self.backoff_base.saturating_mul(1u32 << exponent);
        chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::hours(1))
    }
}

#[async_trait]
impl TaskQueue for SqliteTaskQueue {
    async fn enqueue_at(
        &self,
        job_type: &str,
        payload: Value,
        run_at: DateTime<Utc>,
        priority: i32,
        max_attempts: i32,
    ) -> ApiResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = format_timestamp(Utc::now());
        let payload_str = serde_json::to_string(&payload)
            .map_err(|e| ApiError::Internal(format!("Failed to serialise job payload: {}", e)))?;

        sqlx::query(
            "INSERT INTO jobs (id, job_type, payload, status, priority, run_at, created_at, updated_at, max_attempts)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(job_type)
        .bind(&payload_str)
        .bind(JobStatus::Pending.to_string())
        .bind(priority as i64)
        .bind(format_timestamp(run_at))
        .bind(&now)
        .bind(&now)
        .bind(max_attempts.max(1) as i64)
        .execute(self.db.pool())
        .await?;

        tracing::debug!(
            "Enqueued job {} type={} priority={} run_at={}",
            id,
            job_type,
            priority,
            run_at
        );
        Ok(id)
    }

    async fn fetch_next_job(&self) -> ApiResult<Option<Job>> {
        let now = Utc::now();
        let now_str = format_timestamp(now);
        let lock_until = format_timestamp(
            now + chrono::Duration::from_std(self.lock_timeout)
                .unwrap_or_else(|_| chrono::Duration::minutes(5)),
        );

        // An expired lock counts as a failed attempt
        let exhausted = sqlx::query(
            "UPDATE jobs
             SET status = 'failed', attempts = attempts + 1, locked_until = NULL,
                 last_error = 'lock expired', updated_at = ?
             WHERE status = 'processing' AND locked_until IS NOT NULL AND locked_until < ?
               AND attempts + 1 >= max_attempts",
        )
        .bind(&now_str)
        .bind(&now_str)
        .execute(self.db.pool())
        .await?
        .rows_affected();
        if exhausted > 0 {
            tracing::warn!("Failed {} job(s) whose lock expired on the last attempt", exhausted);
        }

        // Claim and lock in one statement; also reclaims jobs whose lock expired
        let row = sqlx::query(&format!(
            "UPDATE jobs
             SET attempts = CASE WHEN status = 'processing' THEN attempts + 1 ELSE attempts END,
                 status = 'processing', updated_at = ?, locked_until = ?
             WHERE id = (
                 SELECT id FROM jobs
                 WHERE (status = 'pending' AND run_at <= ?)
                    OR (status = 'processing' AND locked_until IS NOT NULL AND locked_until < ?
                        AND attempts + 1 < max_attempts)
                 ORDER BY priority ASC, run_at ASC
                 LIMIT 1
             )
             RETURNING {}",
            JOB_COLUMNS
        ))
        .bind(&now_str)
        .bind(&lock_until)
        .bind(&now_str)
        .bind(&now_str)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => job_from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn complete_job(&self, job_id: &str) -> ApiResult<()> {
        let now = format_timestamp(Utc::now());
        sqlx::query(
            "UPDATE jobs
             SET status = 'completed', locked_until = NULL, updated_at = ?
             WHERE id = ?",
        )
        .bind(&now)
        .bind(job_id)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn fail_job(&self, job_id: &str, error: &str) -> ApiResult<()> {
        let now = Utc::now();

        let row = sqlx::query("SELECT attempts, max_attempts FROM jobs WHERE id = ?")
            .bind(job_id)
            .fetch_one(self.db.pool())
            .await?;

        let attempts: i64 = row.try_get("attempts")?;
        let max_attempts: i64 = row.try_get("max_attempts")?;
        let attempts = attempts as i32;
        let new_attempts = attempts + 1;

        if i64::from(new_attempts) < max_attempts {
            let next_run = now + self.backoff_for(attempts);

            sqlx::query(
                "UPDATE jobs
                 SET status = 'pending', attempts = ?, last_error = ?, run_at = ?,
                     locked_until = NULL, updated_at = ?
                 WHERE id = ?",
            )
            .bind(new_attempts as i64)
            .bind(error)
            .bind(format_timestamp(next_run))
            .bind(format_timestamp(now))
            .bind(job_id)
            .execute(self.db.pool())
            .await?;

            tracing::warn!(
                "Job {} failed (attempt {}/{}), retrying at {}: {}",
                job_id,
                new_attempts,
                max_attempts,
                next_run,
                error
            );
        } else {
            sqlx::query(
                "UPDATE jobs
                 SET status = 'failed', attempts = ?, last_error = ?, locked_until = NULL, updated_at = ?
                 WHERE id = ?",
            )
            .bind(new_attempts as i64)
            .bind(error)
            .bind(format_timestamp(now))
            .bind(job_id)
            .execute(self.db.pool())
            .await?;

            tracing::error!(
                "Job {} failed permanently after {} attempts: {}",
                job_id,
                new_attempts,
                error
            );
        }

        Ok(())
    }

    async fn get_job(&self, job_id: &str) -> ApiResult<Option<Job>> {
        let row = sqlx::query(&format!("SELECT {} FROM jobs WHERE id = ?", JOB_COLUMNS))
            .bind(job_id)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(row) => job_from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn has_outstanding_job(&self, job_type: &str) -> ApiResult<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM jobs
             WHERE job_type = ? AND status IN ('pending', 'processing')",
        )
        .bind(job_type)
        .fetch_one(self.db.pool())
        .await?;

        let total: i64 = row.try_get("total")?;
        Ok(total > 0)
    }

    async fn metrics(&self) -> ApiResult<QueueMetrics> {
        let now = format_timestamp(Utc::now());
        let row = sqlx::query(
            "SELECT
                 COALESCE(SUM(CASE WHEN status = 'pending' AND run_at <= ? THEN 1 ELSE 0 END), 0) AS waiting,
                 COALESCE(SUM(CASE WHEN status = 'pending' AND run_at > ? THEN 1 ELSE 0 END), 0) AS delayed,
                 COALESCE(SUM(CASE WHEN status = 'processing' THEN 1 ELSE 0 END), 0) AS active,
                 COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0) AS completed,
                 COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0) AS failed
             FROM jobs",
        )
        .bind(&now)
        .bind(&now)
        .fetch_one(self.db.pool())
        .await?;

        Ok(QueueMetrics {
            waiting: row.try_get("waiting")?,
            delayed: row.try_get("delayed")?,
            active: row.try_get("active")?,
            completed: row.try_get("completed")?,
            failed: row.try_get("failed")?,
        })
    }
}
