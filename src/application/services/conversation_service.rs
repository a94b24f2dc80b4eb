use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::application::services::AssignmentService;
use crate::domain::entities::{
    AssignmentOutcome, Broker, ChatWebhookEvent, Conversation, ConversationResponse,
    CreateConversationRequest, LeadAcceptedResponse, LeadProfile, MessageKind,
    NewConversationJob, WebhookOutcome, JOB_NEW_CONVERSATION,
};
use crate::domain::ports::{
    chat_platform::ChatPlatform, conversation_repository::ConversationRepository,
    task_queue::TaskQueue, time_service::TimeService,
};
use crate::domain::services::persona;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::message_tracking::BotMessageTracker;

const DEFAULT_LOAN_TYPE: &str = "new_purchase";

#[derive(Clone, Debug)]
pub struct ConversationSettings {
    pub job_delay: Duration,
    pub join_delay: Duration,
    pub max_attempts: i32,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            job_delay: Duration::from_millis(500),
            join_delay: Duration::from_millis(2000),
            max_attempts: 3,
        }
    }
}

/// Lead intake, the `new_conversation` job and inbound chat events
#[derive(Clone)]
pub struct ConversationService {
    conversation_repo: Arc<dyn ConversationRepository>,
    queue: Arc<dyn TaskQueue>,
    assignment_service: AssignmentService,
    chat_platform: Arc<dyn ChatPlatform>,
    tracker: BotMessageTracker,
    time_service: Arc<dyn TimeService>,
    settings: ConversationSettings,
}

impl ConversationService {
    pub fn new(
        conversation_repo: Arc<dyn ConversationRepository>,
        queue: Arc<dyn TaskQueue>,
        assignment_service: AssignmentService,
        chat_platform: Arc<dyn ChatPlatform>,
        tracker: BotMessageTracker,
        time_service: Arc<dyn TimeService>,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            conversation_repo,
            queue,
            assignment_service,
            chat_platform,
            tracker,
            time_service,
            settings,
        }
    }

    /// Record the lead's conversation and queue broker assignment
    pub async fn submit_lead(&self, request: CreateConversationRequest) -> ApiResult<LeadAcceptedResponse> {
        let conversation_id = request
            .conversation_id
            .filter(|id| *id > 0)
            .ok_or_else(|| ApiError::BadRequest("conversationId must be a positive integer".to_string()))?;

        let name = request
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;

        let lead_score = request.lead_score.unwrap_or(50);
        if !(0..=100).contains(&lead_score) {
            return Err(ApiError::BadRequest(
                "leadScore must be between 0 and 100".to_string(),
            ));
        }
        if !request.monthly_income.is_finite() || request.monthly_income < 0.0 {
            return Err(ApiError::BadRequest(
                "monthlyIncome cannot be negative".to_string(),
            ));
        }

        let lead = LeadProfile {
            name,
            email: request.email.filter(|e| !e.trim().is_empty()),
            lead_score,
            loan_type: request
                .loan_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOAN_TYPE.to_string()),
            property_type: request.property_type,
            monthly_income: request.monthly_income,
            timeline: request.timeline,
        };

        let conversation = Conversation::new(conversation_id, request.contact_id, lead);
        self.conversation_repo.create_conversation(&conversation).await?;

        let job = NewConversationJob {
            conversation_id,
            lead_score,
        };
        let run_at = Utc::now()
            + chrono::Duration::from_std(self.settings.job_delay).unwrap_or_else(|_| chrono::Duration::zero());
        let payload = serde_json::to_value(&job)
            .map_err(|e| ApiError::Internal(format!("Failed to encode job payload: {}", e)))?;

        let job_id = self
            .queue
            .enqueue_at(
                JOB_NEW_CONVERSATION,
                payload,
                run_at,
                job.priority(),
                self.settings.max_attempts,
            )
            .await?;

        metrics::counter!("leads_received_total").increment(1);
        tracing::info!(
            "Lead conversation {} queued as job {} (score {}, priority {})",
            conversation_id,
            job_id,
            lead_score,
            job.priority()
        );

        Ok(LeadAcceptedResponse {
            conversation: ConversationResponse::from(conversation),
            job_id,
        })
    }

    pub async fn get_conversation(&self, conversation_id: i64) -> ApiResult<Conversation> {
        self.conversation_repo
            .get_conversation_by_id(conversation_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Conversation {} not found", conversation_id)))
    }

    /// Worker handler for `new_conversation` jobs.
    ///
    /// An `Err` fails the attempt so the queue retries it.
    pub async fn handle_new_conversation(&self, job: &NewConversationJob) -> Result<(), String> {
        let conversation = self
            .conversation_repo
            .get_conversation_by_id(job.conversation_id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("Conversation {} not found", job.conversation_id))?;

        if !conversation.is_active() {
            tracing::info!(
                "Conversation {} completed before assignment, skipping",
                conversation.id
            );
            return Ok(());
        }

        if let Some(broker_id) = conversation.broker_id.as_deref() {
            if conversation.welcome_sent {
                return Ok(());
            }
            // A previous attempt assigned the broker but did not finish the welcome
            let broker = self
                .assignment_service
                .get_broker(broker_id)
                .await
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("Broker {} not found", broker_id))?;
            return self.announce_broker(&conversation, &broker).await;
        }

        let outcome = self
            .assignment_service
            .assign_broker(conversation.id)
            .await
            .map_err(|e| e.to_string())?;

        match outcome {
            AssignmentOutcome::Assigned { broker, .. } => {
                self.announce_broker(&conversation, &broker).await
            }
            AssignmentOutcome::AlreadyAssigned { broker_id } => {
                tracing::info!(
                    "Conversation {} already assigned to {}",
                    conversation.id,
                    broker_id
                );
                Ok(())
            }
            AssignmentOutcome::NoBrokerAvailable => {
                self.post_busy_notice(conversation.id).await;
                Err(format!(
                    "No broker available for conversation {}",
                    conversation.id
                ))
            }
        }
    }

    async fn post_busy_notice(&self, conversation_id: i64) {
        match self.conversation_repo.mark_busy_notice_sent(conversation_id).await {
            Ok(true) => {
                if let Err(e) = self
                    .chat_platform
                    .create_activity_message(conversation_id, persona::BUSY_NOTICE)
                    .await
                {
                    tracing::warn!(
                        "Failed to post busy notice to conversation {}: {}",
                        conversation_id,
                        e
                    );
                }
            }
            Ok(false) => {}
            Err(e) => tracing::warn!(
                "Failed to flag busy notice for conversation {}: {}",
                conversation_id,
                e
            ),
        }
    }

    /// Hand the conversation over on the chat platform and post the persona greeting.
    ///
    /// Attribute and activity updates are best effort; only the greeting is required.
    async fn announce_broker(&self, conversation: &Conversation, broker: &Broker) -> Result<(), String> {
        let attributes = json!({
            "ai_broker_id": broker.id,
            "ai_broker_name": broker.name,
            "broker_persona": broker.personality_type.to_string(),
            "broker_slug": broker.slug,
            "broker_status": "joining",
        });
        if let Err(e) = self
            .chat_platform
            .update_custom_attributes(conversation.id, attributes)
            .await
        {
            tracing::warn!("Failed to set broker attributes on {}: {}", conversation.id, e);
        }

        if let Err(e) = self
            .chat_platform
            .create_activity_message(conversation.id, &persona::reviewing_notice(broker))
            .await
        {
            tracing::warn!("Failed to post reviewing notice on {}: {}", conversation.id, e);
        }

        self.time_service.sleep(self.settings.join_delay).await;

        if let Err(e) = self
            .chat_platform
            .create_activity_message(conversation.id, &persona::joined_notice(broker))
            .await
        {
            tracing::warn!("Failed to post joined notice on {}: {}", conversation.id, e);
        }

        if let Err(e) = self
            .chat_platform
            .update_custom_attributes(conversation.id, json!({ "broker_status": "engaged" }))
            .await
        {
            tracing::warn!("Failed to mark broker engaged on {}: {}", conversation.id, e);
        }

        let greeting = persona::greeting(broker, &conversation.lead.name);
        let message_id = self
            .chat_platform
            .send_message(conversation.id, &greeting)
            .await
            .map_err(|e| format!("Failed to send greeting to {}: {}", conversation.id, e))?;

        self.tracker
            .track(conversation.id, &greeting, message_id.as_deref())
            .await;

        self.conversation_repo
            .mark_welcome_sent(conversation.id)
            .await
            .map_err(|e| e.to_string())?;

        tracing::info!(
            "Broker {} joined conversation {}",
            broker.name,
            conversation.id
        );
        Ok(())
    }

    /// Record a message this service (or a companion bot) posted, for echo suppression
    pub async fn track_bot_message(&self, conversation_id: i64, content: &str, message_id: Option<&str>) {
        self.tracker.track(conversation_id, content, message_id).await;
    }

    pub async fn handle_webhook(&self, event: &ChatWebhookEvent) -> ApiResult<WebhookOutcome> {
        match event.event.as_str() {
            "conversation_status_changed" | "conversation_resolved" => {
                self.handle_status_change(event).await
            }
            "message_created" => self.handle_message_created(event).await,
            other => Ok(WebhookOutcome::Ignored {
                reason: format!("unhandled event {}", other),
            }),
        }
    }

    async fn handle_status_change(&self, event: &ChatWebhookEvent) -> ApiResult<WebhookOutcome> {
        let conversation_id = event.conversation_id().or_else(|| {
            event
                .id
                .as_ref()
                .and_then(|v| v.as_i64())
        });
        let Some(conversation_id) = conversation_id else {
            return Ok(WebhookOutcome::ignored("missing conversation id"));
        };

        let resolved = event.event == "conversation_resolved"
            || event.conversation_status() == Some("resolved");
        if !resolved {
            return Ok(WebhookOutcome::ignored("status is not resolved"));
        }

        match self.assignment_service.complete_conversation(conversation_id).await {
            Ok(_) => Ok(WebhookOutcome::Completed),
            Err(ApiError::NotFound(_)) => Ok(WebhookOutcome::ignored("unknown conversation")),
            Err(e) => Err(e),
        }
    }

    async fn handle_message_created(&self, event: &ChatWebhookEvent) -> ApiResult<WebhookOutcome> {
        let Some(conversation_id) = event.conversation_id() else {
            return Ok(WebhookOutcome::ignored("missing conversation id"));
        };

        match event.message_kind() {
            MessageKind::Outgoing => return Ok(WebhookOutcome::ignored("outgoing message")),
            MessageKind::Activity => return Ok(WebhookOutcome::ignored("activity message")),
            MessageKind::Incoming | MessageKind::Unknown => {}
        }
        if event.is_private() {
            return Ok(WebhookOutcome::ignored("private note"));
        }

        let content = event.content();
        if persona::is_system_notice(content) {
            return Ok(WebhookOutcome::ignored("activity message"));
        }

        let message_id = event.message_id();
        if self
            .tracker
            .is_echo(conversation_id, content, message_id.as_deref())
            .await
        {
            metrics::counter!("bot_echoes_suppressed_total").increment(1);
            tracing::debug!("Suppressed echo in conversation {}", conversation_id);
            return Ok(WebhookOutcome::Echo);
        }

        if !event.is_from_contact() {
            return Ok(WebhookOutcome::ignored("not from contact"));
        }

        if self.conversation_repo.touch_conversation(conversation_id).await? {
            Ok(WebhookOutcome::Recorded)
        } else {
            Ok(WebhookOutcome::ignored("unknown conversation"))
        }
    }
}
