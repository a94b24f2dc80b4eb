use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::application::services::{AssignmentService, ConversationService};
use crate::domain::entities::{
    Job, NewConversationJob, JOB_CLEANUP_BOT_MESSAGES, JOB_COMPLETE_STALE_CONVERSATIONS,
    JOB_NEW_CONVERSATION, PRIORITY_MAINTENANCE,
};
use crate::domain::ports::task_queue::TaskQueue;
use crate::domain::ports::time_service::TimeService;
use crate::shared::message_tracking::BotMessageTracker;

const STALE_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);
const BOT_MESSAGE_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);
const ERROR_BACKOFF: Duration = Duration::from_secs(5);
const MAINTENANCE_MAX_ATTEMPTS: i32 = 3;

pub struct JobProcessor {
    queue: Arc<dyn TaskQueue>,
    conversation_service: ConversationService,
    assignment_service: AssignmentService,
    tracker: BotMessageTracker,
    time_service: Arc<dyn TimeService>,
    poll_interval: Duration,
    stale_after: chrono::Duration,
}

impl JobProcessor {
    pub fn new(
        queue: Arc<dyn TaskQueue>,
        conversation_service: ConversationService,
        assignment_service: AssignmentService,
        tracker: BotMessageTracker,
        time_service: Arc<dyn TimeService>,
        poll_interval: Duration,
        stale_after: chrono::Duration,
    ) -> Self {
        Self {
            queue,
            conversation_service,
            assignment_service,
            tracker,
            time_service,
            poll_interval,
            stale_after,
        }
    }

    /// Process jobs until the token is cancelled
    pub async fn run(&self, cancel: CancellationToken) {
        info!("Starting JobProcessor...");
        loop {
            if cancel.is_cancelled() {
                break;
            }

            let pause = match self.process_next().await {
                // Job processed, check for next one immediately
                Ok(Some(_)) => continue,
                Ok(None) => self.poll_interval,
                Err(e) => {
                    error!("Error processing job: {}", e);
                    ERROR_BACKOFF
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.time_service.sleep(pause) => {}
            }
        }
        info!("JobProcessor stopped");
    }

    pub async fn process_next(&self) -> Result<Option<()>, String> {
        let job = self
            .queue
            .fetch_next_job()
            .await
            .map_err(|e| e.to_string())?;

        let Some(job) = job else {
            return Ok(None);
        };

        info!(
            "Processing job {} (type: {}, attempt {}/{})",
            job.id,
            job.job_type,
            job.attempts + 1,
            job.max_attempts
        );

        match self.execute_job(&job).await {
            Ok(_) => {
                info!("Job {} completed successfully", job.id);
                metrics::counter!("jobs_processed_total", "outcome" => "completed").increment(1);
                if let Err(e) = self.queue.complete_job(&job.id).await {
                    error!("Failed to mark job {} as completed: {}", job.id, e);
                }
            }
            Err(e) => {
                error!("Job {} failed: {}", job.id, e);
                metrics::counter!("jobs_processed_total", "outcome" => "failed").increment(1);
                if let Err(retry_err) = self.queue.fail_job(&job.id, &e).await {
                    error!("Failed to mark job {} as failed: {}", job.id, retry_err);
                }
            }
        }

        Ok(Some(()))
    }

    async fn execute_job(&self, job: &Job) -> Result<(), String> {
        match job.job_type.as_str() {
            JOB_NEW_CONVERSATION => {
                let payload: NewConversationJob = serde_json::from_value(job.payload.clone())
                    .map_err(|e| format!("Invalid new_conversation payload: {}", e))?;
                self.conversation_service
                    .handle_new_conversation(&payload)
                    .await
            }
            JOB_COMPLETE_STALE_CONVERSATIONS => self.handle_complete_stale_conversations().await,
            JOB_CLEANUP_BOT_MESSAGES => self.handle_cleanup_bot_messages().await,
            _ => Err(format!("Unknown job type: {}", job.job_type)),
        }
    }

    /// Queue the recurring maintenance jobs unless they are already queued
    pub async fn schedule_recurring_jobs(&self) -> Result<(), String> {
        for job_type in [JOB_COMPLETE_STALE_CONVERSATIONS, JOB_CLEANUP_BOT_MESSAGES] {
            let outstanding = self
                .queue
                .has_outstanding_job(job_type)
                .await
                .map_err(|e| e.to_string())?;
            if !outstanding {
                self.schedule_in(job_type, Duration::ZERO).await?;
            }
        }
        Ok(())
    }

    async fn schedule_in(&self, job_type: &str, delay: Duration) -> Result<(), String> {
        let run_at = self.time_service.now()
            + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
        self.queue
            .enqueue_at(
                job_type,
                Value::Null,
                run_at,
                PRIORITY_MAINTENANCE,
                MAINTENANCE_MAX_ATTEMPTS,
            )
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    // --- Job Handlers ---

    async fn handle_complete_stale_conversations(&self) -> Result<(), String> {
        match self
            .assignment_service
            .complete_stale_conversations(self.stale_after)
            .await
        {
            Ok(count) => {
                if count > 0 {
                    info!("Completed {} stale conversations", count);
                }
            }
            Err(e) => error!("Failed to complete stale conversations: {}", e),
        }

        // Schedule next run in 15 minutes
        self.schedule_in(JOB_COMPLETE_STALE_CONVERSATIONS, STALE_SWEEP_INTERVAL)
            .await
    }

    async fn handle_cleanup_bot_messages(&self) -> Result<(), String> {
        let removed = self.tracker.cleanup_expired().await;
        if removed > 0 {
            info!("Forgot bot messages for {} idle conversations", removed);
        }

        // Schedule next run in 5 minutes
        self.schedule_in(JOB_CLEANUP_BOT_MESSAGES, BOT_MESSAGE_CLEANUP_INTERVAL)
            .await
    }
}
