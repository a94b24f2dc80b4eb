use crate::domain::entities::{
    AssignmentMethod, AssignmentOutcome, Broker, BrokerAssignment, BrokerDirectoryEntry,
    CompletionResponse, Conversation, ConversationBrokerResponse,
};
use crate::domain::ports::{
    assignment_repository::AssignmentRepository, broker_repository::BrokerRepository,
    conversation_repository::ConversationRepository,
};
use crate::domain::services::persona;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::utils::format_timestamp;
use chrono::Utc;
use std::sync::Arc;

/// Matches lead conversations to AI broker personas and keeps workload counters honest
#[derive(Clone)]
pub struct AssignmentService {
    broker_repo: Arc<dyn BrokerRepository>,
    conversation_repo: Arc<dyn ConversationRepository>,
    assignment_repo: Arc<dyn AssignmentRepository>,
}

impl AssignmentService {
    pub fn new(
        broker_repo: Arc<dyn BrokerRepository>,
        conversation_repo: Arc<dyn ConversationRepository>,
        assignment_repo: Arc<dyn AssignmentRepository>,
    ) -> Self {
        Self {
            broker_repo,
            conversation_repo,
            assignment_repo,
        }
    }

    async fn require_conversation(&self, conversation_id: i64) -> ApiResult<Conversation> {
        self.conversation_repo
            .get_conversation_by_id(conversation_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Conversation {} not found", conversation_id)))
    }

    /// Pick the best available broker and reserve a slot on it.
    ///
    /// No capacity anywhere is an outcome, not an error.
    pub async fn assign_broker(&self, conversation_id: i64) -> ApiResult<AssignmentOutcome> {
        let conversation = self.require_conversation(conversation_id).await?;

        if let Some(broker_id) = conversation.broker_id {
            return Ok(AssignmentOutcome::AlreadyAssigned { broker_id });
        }
        if !conversation.is_active() {
            return Err(ApiError::Conflict(format!(
                "Conversation {} is already completed",
                conversation_id
            )));
        }

        let brokers = self.broker_repo.list_assignable_brokers().await?;
        let target = persona::target_personality(&conversation.lead);

        for candidate in persona::rank_candidates(&brokers, target) {
            let reason = persona::assignment_reason(&conversation.lead, target, candidate);
            let assignment = BrokerAssignment::new(
                conversation_id,
                candidate.id.clone(),
                AssignmentMethod::Automatic,
                Some(reason),
            );

            if self.assignment_repo.assign_broker(&assignment).await? {
                metrics::counter!("broker_assignments_total", "method" => "automatic").increment(1);

                let mut broker = candidate.clone();
                broker.current_workload += 1;
                broker.active_conversations += 1;
                broker.is_available = broker.current_workload < broker.max_concurrent_chats;

                return Ok(AssignmentOutcome::Assigned { broker, assignment });
            }

            // Lost the reservation race, try the next candidate
            tracing::debug!(
                "Broker {} filled up before conversation {} could be assigned",
                candidate.id,
                conversation_id
            );
        }

        metrics::counter!("broker_assignment_unavailable_total").increment(1);
        tracing::warn!(
            "No broker available for conversation {} (target persona {})",
            conversation_id,
            target
        );
        Ok(AssignmentOutcome::NoBrokerAvailable)
    }

    /// Assign or reassign a specific broker; capacity still applies
    pub async fn assign_manually(
        &self,
        conversation_id: i64,
        broker_id: &str,
        reason: Option<String>,
    ) -> ApiResult<ConversationBrokerResponse> {
        let conversation = self.require_conversation(conversation_id).await?;
        if !conversation.is_active() {
            return Err(ApiError::Conflict(format!(
                "Conversation {} is already completed",
                conversation_id
            )));
        }

        let broker = self
            .broker_repo
            .get_broker_by_id(broker_id)
            .await?
            .filter(|b| b.is_active)
            .ok_or_else(|| ApiError::NotFound(format!("Broker {} not found", broker_id)))?;

        let assignment = BrokerAssignment::new(
            conversation_id,
            broker.id.clone(),
            AssignmentMethod::Manual,
            reason.or_else(|| Some("Manual assignment".to_string())),
        );

        if !self.assignment_repo.assign_broker(&assignment).await? {
            return Err(ApiError::Conflict(format!(
                "Broker {} has no remaining capacity",
                broker.name
            )));
        }

        metrics::counter!("broker_assignments_total", "method" => "manual").increment(1);

        // Re-read so the response reflects the stored record (reassignment keeps its id)
        let stored = self
            .assignment_repo
            .get_assignment(conversation_id)
            .await?
            .unwrap_or(assignment);
        Ok(ConversationBrokerResponse::new(&broker, &stored))
    }

    pub async fn broker_for_conversation(
        &self,
        conversation_id: i64,
    ) -> ApiResult<ConversationBrokerResponse> {
        let assignment = self
            .assignment_repo
            .get_assignment(conversation_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "No broker assigned to conversation {}",
                    conversation_id
                ))
            })?;

        let broker = self
            .broker_repo
            .get_broker_by_id(&assignment.broker_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Broker {} not found", assignment.broker_id)))?;

        Ok(ConversationBrokerResponse::new(&broker, &assignment))
    }

    /// Complete the conversation and give the broker's slot back. Safe to call repeatedly.
    pub async fn complete_conversation(&self, conversation_id: i64) -> ApiResult<CompletionResponse> {
        self.require_conversation(conversation_id).await?;

        let record = self
            .assignment_repo
            .complete_conversation(conversation_id)
            .await?;

        if record.completed {
            metrics::counter!("conversations_completed_total").increment(1);
        }

        Ok(CompletionResponse {
            conversation_id,
            completed: record.completed,
            released_broker_id: record.released_broker_id,
        })
    }

    /// Complete active conversations idle for longer than `older_than`
    pub async fn complete_stale_conversations(&self, older_than: chrono::Duration) -> ApiResult<usize> {
        let cutoff = format_timestamp(Utc::now() - older_than);
        let stale = self
            .conversation_repo
            .list_stale_conversation_ids(&cutoff)
            .await?;

        let mut completed = 0;
        for conversation_id in stale {
            let record = self
                .assignment_repo
                .complete_conversation(conversation_id)
                .await?;
            if record.completed {
                completed += 1;
            }
        }

        if completed > 0 {
            metrics::counter!("conversations_completed_total").increment(completed as u64);
        }
        Ok(completed)
    }

    pub async fn list_brokers(&self) -> ApiResult<Vec<BrokerDirectoryEntry>> {
        let brokers = self.broker_repo.list_active_brokers().await?;
        Ok(brokers.iter().map(BrokerDirectoryEntry::from).collect())
    }

    pub async fn get_broker(&self, broker_id: &str) -> ApiResult<Option<Broker>> {
        self.broker_repo.get_broker_by_id(broker_id).await
    }
}
