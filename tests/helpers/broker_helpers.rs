use brokerdesk::domain::entities::{Broker, Conversation, LeadProfile, PersonalityType};
use brokerdesk::domain::ports::broker_repository::BrokerRepository;
use brokerdesk::domain::ports::conversation_repository::ConversationRepository;
use brokerdesk::infrastructure::persistence::Database;

pub async fn create_test_broker(
    db: &Database,
    id: &str,
    personality_type: PersonalityType,
    max_concurrent_chats: i32,
) -> Broker {
    let broker = Broker::new(
        id.to_string(),
        format!("Broker {}", id),
        "Mortgage Consultant".to_string(),
        personality_type,
        max_concurrent_chats,
    );
    db.create_broker(&broker)
        .await
        .expect("Failed to create broker");
    broker
}

pub fn test_lead(name: &str, lead_score: i32) -> LeadProfile {
    LeadProfile {
        name: name.to_string(),
        email: None,
        lead_score,
        loan_type: "new_purchase".to_string(),
        property_type: None,
        monthly_income: 8000.0,
        timeline: None,
    }
}

pub async fn create_test_conversation(db: &Database, id: i64, lead_score: i32) -> Conversation {
    let conversation = Conversation::new(id, None, test_lead("Alex Tan", lead_score));
    db.create_conversation(&conversation)
        .await
        .expect("Failed to create conversation");
    conversation
}

pub async fn reload_broker(db: &Database, id: &str) -> Broker {
    db.get_broker_by_id(id)
        .await
        .expect("Failed to load broker")
        .expect("Broker missing")
}

pub async fn reload_conversation(db: &Database, id: i64) -> Conversation {
    db.get_conversation_by_id(id)
        .await
        .expect("Failed to load conversation")
        .expect("Conversation missing")
}
