use crate::application::services::{AssignmentService, ConversationService, ConversationSettings};
use crate::config::Config;
use crate::domain::entities::{Broker, PersonalityType};
use crate::domain::ports::assignment_repository::AssignmentRepository;
use crate::domain::ports::broker_repository::BrokerRepository;
use crate::domain::ports::chat_platform::ChatPlatform;
use crate::domain::ports::conversation_repository::ConversationRepository;
use crate::domain::ports::task_queue::TaskQueue;
use crate::domain::ports::time_service::TimeService;
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use crate::infrastructure::persistence::Database;
use crate::infrastructure::providers::{ChatwootClient, LoggingChatPlatform};
use crate::infrastructure::runtime::TokioTimeService;
use crate::infrastructure::workers::{JobProcessor, SqliteTaskQueue, WorkerManager};
use crate::shared::message_tracking::BotMessageTracker;
use std::sync::Arc;

const DEFAULT_MAX_CONCURRENT_CHATS: i32 = 3;

pub async fn build_app_state(
    db: Database,
    config: &Config,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let chat_platform: Arc<dyn ChatPlatform> = match &config.chatwoot {
        Some(chatwoot) => {
            tracing::info!("Chatwoot client configured for {}", chatwoot.base_url);
            Arc::new(ChatwootClient::new(chatwoot)?)
        }
        None => {
            tracing::warn!("Chatwoot not configured; chat messages will only be logged");
            Arc::new(LoggingChatPlatform::new())
        }
    };

    Ok(build_app_state_with(db, config, chat_platform))
}

/// Wire services around an explicit chat platform
pub fn build_app_state_with(
    db: Database,
    config: &Config,
    chat_platform: Arc<dyn ChatPlatform>,
) -> AppState {
    let task_queue: Arc<dyn TaskQueue> = Arc::new(SqliteTaskQueue::with_backoff(
        db.clone(),
        config.worker.backoff_base,
    ));
    let time_service: Arc<dyn TimeService> = Arc::new(TokioTimeService::new());
    let tracker = BotMessageTracker::new();

    let assignment_service = AssignmentService::new(
        Arc::new(db.clone()) as Arc<dyn BrokerRepository>,
        Arc::new(db.clone()) as Arc<dyn ConversationRepository>,
        Arc::new(db.clone()) as Arc<dyn AssignmentRepository>,
    );

    let conversation_service = ConversationService::new(
        Arc::new(db.clone()) as Arc<dyn ConversationRepository>,
        task_queue.clone(),
        assignment_service.clone(),
        chat_platform,
        tracker.clone(),
        time_service.clone(),
        ConversationSettings {
            job_delay: config.worker.job_delay,
            join_delay: config.worker.join_delay,
            max_attempts: config.worker.max_attempts,
        },
    );

    let processor = Arc::new(JobProcessor::new(
        task_queue.clone(),
        conversation_service.clone(),
        assignment_service.clone(),
        tracker,
        time_service,
        config.worker.poll_interval,
        config.stale_after(),
    ));
    let worker_manager = Arc::new(WorkerManager::new(processor));

    AppState {
        db,
        task_queue,
        assignment_service,
        conversation_service,
        worker_manager,
    }
}

fn persona(
    id: &str,
    name: &str,
    role: &str,
    personality_type: PersonalityType,
    voice_description: &str,
    communication_style: &str,
    approach_style: &str,
) -> Broker {
    let mut broker = Broker::new(
        id.to_string(),
        name.to_string(),
        role.to_string(),
        personality_type,
        DEFAULT_MAX_CONCURRENT_CHATS,
    );
    broker.voice_description = Some(voice_description.to_string());
    broker.communication_style = Some(communication_style.to_string());
    broker.approach_style = Some(approach_style.to_string());
    broker
}

/// Default AI broker roster
pub fn default_brokers() -> Vec<Broker> {
    vec![
        persona(
            "broker_1",
            "Jasmine Lee",
            "Senior Mortgage Specialist",
            PersonalityType::Aggressive,
            "Confident and energetic, speaks with authority",
            "direct",
            "premium_rates_focus",
        ),
        persona(
            "broker_2",
            "Rachel Tan",
            "Mortgage Consultant",
            PersonalityType::Balanced,
            "Warm and reassuring, speaks clearly",
            "consultative",
            "balanced_analysis",
        ),
        persona(
            "broker_3",
            "David Chen",
            "Commercial Loan Specialist",
            PersonalityType::Conservative,
            "Measured and thoughtful, speaks deliberately",
            "educational",
            "risk_mitigation_focus",
        ),
        persona(
            "broker_4",
            "Marcus Wong",
            "HDB Loan Specialist",
            PersonalityType::Aggressive,
            "Dynamic and persuasive, speaks enthusiastically",
            "direct",
            "quick_approval_focus",
        ),
        persona(
            "broker_5",
            "Sarah Chen",
            "Private Property Consultant",
            PersonalityType::Balanced,
            "Professional and friendly, speaks with clarity",
            "consultative",
            "comprehensive_analysis",
        ),
        persona(
            "broker_6",
            "Michelle Koh",
            "Luxury Property Specialist",
            PersonalityType::Luxury,
            "Polished and discreet, speaks with quiet confidence",
            "advisory",
            "private_banking_focus",
        ),
    ]
}

/// Insert the default roster into an empty broker table
pub async fn seed_default_brokers(db: &Database) -> ApiResult<usize> {
    if <Database as BrokerRepository>::count_brokers(db).await? > 0 {
        tracing::debug!("Brokers already present, skipping seed");
        return Ok(0);
    }

    let brokers = default_brokers();
    for broker in &brokers {
        <Database as BrokerRepository>::create_broker(db, broker).await?;
    }

    tracing::info!("Seeded {} default brokers", brokers.len());
    Ok(brokers.len())
}
