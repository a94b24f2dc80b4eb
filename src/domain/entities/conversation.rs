use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::utils::now_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Completed,
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationStatus::Active => write!(f, "active"),
            ConversationStatus::Completed => write!(f, "completed"),
        }
    }
}

impl From<String> for ConversationStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "completed" => ConversationStatus::Completed,
            _ => ConversationStatus::Active,
        }
    }
}

/// What the lead told us on the inquiry form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadProfile {
    pub name: String,
    pub email: Option<String>,
    pub lead_score: i32,
    pub loan_type: String,
    pub property_type: Option<String>,
    pub monthly_income: f64,
    pub timeline: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Chat platform conversation id
    pub id: i64,
    pub contact_id: Option<i64>,
    pub broker_id: Option<String>,
    pub lead: LeadProfile,
    pub status: ConversationStatus,
    pub welcome_sent: bool,
    pub busy_notice_sent: bool,
    pub last_activity_at: String,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Conversation {
    pub fn new(id: i64, contact_id: Option<i64>, lead: LeadProfile) -> Self {
        let now = now_timestamp();
        Self {
            id,
            contact_id,
            broker_id: None,
            lead,
            status: ConversationStatus::Active,
            welcome_sent: false,
            busy_notice_sent: false,
            last_activity_at: now.clone(),
            completed_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.broker_id.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.status == ConversationStatus::Active
    }
}

// API Request models
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    pub conversation_id: Option<i64>,
    pub contact_id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub lead_score: Option<i32>,
    pub loan_type: Option<String>,
    pub property_type: Option<String>,
    #[serde(default)]
    pub monthly_income: f64,
    pub timeline: Option<String>,
}

// API Response models
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: i64,
    pub broker_id: Option<String>,
    pub status: ConversationStatus,
    pub lead_score: i32,
    pub loan_type: String,
    pub last_activity_at: String,
    pub completed_at: Option<String>,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id,
            broker_id: conversation.broker_id,
            status: conversation.status,
            lead_score: conversation.lead.lead_score,
            loan_type: conversation.lead.loan_type,
            last_activity_at: conversation.last_activity_at,
            completed_at: conversation.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadAcceptedResponse {
    pub conversation: ConversationResponse,
    pub job_id: String,
}
