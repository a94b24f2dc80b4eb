use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const JOB_NEW_CONVERSATION: &str = "new_conversation";
pub const JOB_COMPLETE_STALE_CONVERSATIONS: &str = "complete_stale_conversations";
pub const JOB_CLEANUP_BOT_MESSAGES: &str = "cleanup_bot_messages";

/// High-value leads jump the queue
pub const PRIORITY_HIGH: i32 = 1;
pub const PRIORITY_NORMAL: i32 = 5;
pub const PRIORITY_MAINTENANCE: i32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "processing" => JobStatus::Processing,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub job_type: String,
    pub payload: Value,
    pub status: JobStatus,
    pub priority: i32,
    pub run_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub attempts: i32,
    pub max_attempts: i32,
    pub last_error: Option<String>,
}

/// Payload of a `new_conversation` job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConversationJob {
    pub conversation_id: i64,
    pub lead_score: i32,
}

impl NewConversationJob {
    pub fn priority(&self) -> i32 {
        if self.lead_score > 75 {
            PRIORITY_HIGH
        } else {
            PRIORITY_NORMAL
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueMetrics {
    pub waiting: i64,
    pub delayed: i64,
    pub active: i64,
    pub completed: i64,
    pub failed: i64,
}

impl QueueMetrics {
    pub fn total_outstanding(&self) -> i64 {
        self.waiting + self.delayed + self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_score_leads_get_high_priority() {
        let job = NewConversationJob {
            conversation_id: 1,
            lead_score: 80,
        };
        assert_eq!(job.priority(), PRIORITY_HIGH);

        let job = NewConversationJob {
            conversation_id: 2,
            lead_score: 75,
        };
        assert_eq!(job.priority(), PRIORITY_NORMAL);
    }

    #[test]
    fn test_job_status_round_trips_through_strings() {
        for status in [
            JobStatus::Pending,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::from(status.to_string()), status);
        }
    }

    #[test]
    fn test_outstanding_excludes_finished_jobs() {
        let metrics = QueueMetrics {
            waiting: 2,
            delayed: 1,
            active: 1,
            completed: 10,
            failed: 3,
        };
        assert_eq!(metrics.total_outstanding(), 4);
    }
}
