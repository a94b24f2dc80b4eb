mod helpers;

use brokerdesk::domain::entities::{JobStatus, PRIORITY_HIGH, PRIORITY_MAINTENANCE, PRIORITY_NORMAL};
use brokerdesk::domain::ports::task_queue::TaskQueue;
use brokerdesk::infrastructure::workers::SqliteTaskQueue;
use chrono::Utc;
use helpers::*;
use serde_json::json;
use std::time::Duration;
use tokio_test::assert_ok;

async fn enqueue_now(
    queue: &SqliteTaskQueue,
    job_type: &str,
    payload: serde_json::Value,
    max_attempts: i32,
) -> brokerdesk::infrastructure::http::middleware::ApiResult<String> {
    queue
        .enqueue_at(job_type, payload, Utc::now(), PRIORITY_NORMAL, max_attempts)
        .await
}

#[tokio::test]
async fn test_lower_priority_value_is_claimed_first() {
    let db = setup_test_db().await;
    let queue = SqliteTaskQueue::with_backoff(db.clone(), Duration::ZERO);
    let now = Utc::now() - chrono::Duration::seconds(1);

    let maintenance = queue
        .enqueue_at("sweep", json!({}), now, PRIORITY_MAINTENANCE, 3)
        .await
        .unwrap();
    let normal = queue
        .enqueue_at("lead", json!({ "n": 1 }), now, PRIORITY_NORMAL, 3)
        .await
        .unwrap();
    let high = queue
        .enqueue_at("lead", json!({ "n": 2 }), now, PRIORITY_HIGH, 3)
        .await
        .unwrap();

    let order: Vec<String> = [
        queue.fetch_next_job().await.unwrap().unwrap().id,
        queue.fetch_next_job().await.unwrap().unwrap().id,
        queue.fetch_next_job().await.unwrap().unwrap().id,
    ]
    .to_vec();

    assert_eq!(order, vec![high, normal, maintenance]);
    assert!(queue.fetch_next_job().await.unwrap().is_none());
}

#[tokio::test]
async fn test_delayed_job_is_not_claimed_early() {
    let db = setup_test_db().await;
    let queue = SqliteTaskQueue::new(db.clone());

    queue
        .enqueue_at(
            "lead",
            json!({}),
            Utc::now() + chrono::Duration::minutes(10),
            PRIORITY_NORMAL,
            3,
        )
        .await
        .unwrap();

    assert!(queue.fetch_next_job().await.unwrap().is_none());

    let metrics = queue.metrics().await.unwrap();
    assert_eq!(metrics.delayed, 1);
    assert_eq!(metrics.waiting, 0);
}

#[tokio::test]
async fn test_claimed_job_carries_payload() {
    let db = setup_test_db().await;
    let queue = SqliteTaskQueue::new(db.clone());

    let id = assert_ok!(enqueue_now(&queue, "lead", json!({ "conversationId": 42 }), 3).await);

    let job = assert_ok!(queue.fetch_next_job().await).expect("job should be ready");
    assert_eq!(job.id, id);
    assert_eq!(job.status, JobStatus::Processing);
    assert_eq!(job.payload["conversationId"], 42);
    assert_eq!(job.attempts, 0);
}

#[tokio::test]
async fn test_failed_job_is_retried_with_backoff() {
    let db = setup_test_db().await;
    let queue = SqliteTaskQueue::with_backoff(db.clone(), Duration::from_secs(60));

    let id = assert_ok!(enqueue_now(&queue, "lead", json!({}), 3).await);
    assert_ok!(queue.fetch_next_job().await);
    assert_ok!(queue.fail_job(&id, "no broker").await);

    let job = queue.get_job(&id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.attempts, 1);
    assert_eq!(job.last_error.as_deref(), Some("no broker"));
    assert!(job.run_at > Utc::now() + chrono::Duration::seconds(30));

    // Still backing off
    assert!(queue.fetch_next_job().await.unwrap().is_none());
}

#[tokio::test]
async fn test_job_fails_after_max_attempts() {
    let db = setup_test_db().await;
    let queue = SqliteTaskQueue::with_backoff(db.clone(), Duration::ZERO);

    let id = enqueue_now(&queue, "lead", json!({}), 2).await.unwrap();

    for _ in 0..2 {
        let job = queue.fetch_next_job().await.unwrap().expect("job should be ready");
        queue.fail_job(&job.id, "boom").await.unwrap();
    }

    let job = queue.get_job(&id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.attempts, 2);
    assert!(queue.fetch_next_job().await.unwrap().is_none());

    let metrics = queue.metrics().await.unwrap();
    assert_eq!(metrics.failed, 1);
    assert_eq!(metrics.total_outstanding(), 0);
}

#[tokio::test]
async fn test_expired_lock_is_reclaimed() {
    let db = setup_test_db().await;
    let queue = SqliteTaskQueue::new(db.clone());

    let id = enqueue_now(&queue, "lead", json!({}), 3).await.unwrap();
    queue.fetch_next_job().await.unwrap().unwrap();
    assert!(queue.fetch_next_job().await.unwrap().is_none());

    // Simulate a worker that died mid-job
    sqlx::query("UPDATE jobs SET locked_until = ? WHERE id = ?")
        .bind("2020-01-01T00:00:00.000Z")
        .bind(&id)
        .execute(db.pool())
        .await
        .unwrap();

    let reclaimed = queue.fetch_next_job().await.unwrap().expect("lock should expire");
    assert_eq!(reclaimed.id, id);
    assert_eq!(reclaimed.attempts, 1);
}

#[tokio::test]
async fn test_expired_lock_on_last_attempt_fails_job() {
    let db = setup_test_db().await;
    let queue = SqliteTaskQueue::new(db.clone());

    let id = enqueue_now(&queue, "lead", json!({}), 2).await.unwrap();

    for _ in 0..2 {
        queue.fetch_next_job().await.unwrap().expect("job should be claimable");
        sqlx::query("UPDATE jobs SET locked_until = ? WHERE id = ?")
            .bind("2020-01-01T00:00:00.000Z")
            .bind(&id)
            .execute(db.pool())
            .await
            .unwrap();
    }

    assert!(queue.fetch_next_job().await.unwrap().is_none());

    let job = queue.get_job(&id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.attempts, 2);
    assert_eq!(job.last_error.as_deref(), Some("lock expired"));
    assert!(!queue.has_outstanding_job("lead").await.unwrap());
}

#[tokio::test]
async fn test_outstanding_job_tracking() {
    let db = setup_test_db().await;
    let queue = SqliteTaskQueue::new(db.clone());

    assert!(!queue.has_outstanding_job("sweep").await.unwrap());

    let id = enqueue_now(&queue, "sweep", json!(null), 3).await.unwrap();
    assert!(queue.has_outstanding_job("sweep").await.unwrap());

    queue.fetch_next_job().await.unwrap().unwrap();
    assert!(queue.has_outstanding_job("sweep").await.unwrap());

    queue.complete_job(&id).await.unwrap();
    assert!(!queue.has_outstanding_job("sweep").await.unwrap());
    assert_eq!(queue.metrics().await.unwrap().completed, 1);
}
