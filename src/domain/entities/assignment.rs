use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::entities::{Broker, BrokerProfile};
use crate::shared::utils::now_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMethod {
    Automatic,
    Manual,
}

impl fmt::Display for AssignmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentMethod::Automatic => write!(f, "automatic"),
            AssignmentMethod::Manual => write!(f, "manual"),
        }
    }
}

impl From<String> for AssignmentMethod {
    fn from(s: String) -> Self {
        match s.as_str() {
            "manual" => AssignmentMethod::Manual,
            _ => AssignmentMethod::Automatic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Active,
    Completed,
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStatus::Active => write!(f, "active"),
            AssignmentStatus::Completed => write!(f, "completed"),
        }
    }
}

impl From<String> for AssignmentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "completed" => AssignmentStatus::Completed,
            _ => AssignmentStatus::Active,
        }
    }
}

/// Link between a conversation and the broker handling it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerAssignment {
    pub id: String,
    pub conversation_id: i64,
    pub broker_id: String,
    pub method: AssignmentMethod,
    pub reason: Option<String>,
    pub status: AssignmentStatus,
    pub assigned_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

impl BrokerAssignment {
    pub fn new(
        conversation_id: i64,
        broker_id: String,
        method: AssignmentMethod,
        reason: Option<String>,
    ) -> Self {
        let now = now_timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id,
            broker_id,
            method,
            reason,
            status: AssignmentStatus::Active,
            assigned_at: now.clone(),
            updated_at: now,
            completed_at: None,
        }
    }
}

/// Result of an automatic assignment attempt
#[derive(Debug, Clone)]
pub enum AssignmentOutcome {
    Assigned {
        broker: Broker,
        assignment: BrokerAssignment,
    },
    AlreadyAssigned {
        broker_id: String,
    },
    NoBrokerAvailable,
}

impl AssignmentOutcome {
    pub fn is_assigned(&self) -> bool {
        matches!(self, AssignmentOutcome::Assigned { .. })
    }
}

// API Request models
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualAssignmentRequest {
    pub broker_id: Option<String>,
    pub reason: Option<String>,
}

// API Response models
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationBrokerResponse {
    pub conversation_id: i64,
    pub broker: BrokerProfile,
    pub assignment_method: AssignmentMethod,
    pub assignment_status: AssignmentStatus,
    pub assigned_at: String,
}

impl ConversationBrokerResponse {
    pub fn new(broker: &Broker, assignment: &BrokerAssignment) -> Self {
        Self {
            conversation_id: assignment.conversation_id,
            broker: BrokerProfile::from(broker),
            assignment_method: assignment.method,
            assignment_status: assignment.status,
            assigned_at: assignment.assigned_at.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub conversation_id: i64,
    pub completed: bool,
    pub released_broker_id: Option<String>,
}
