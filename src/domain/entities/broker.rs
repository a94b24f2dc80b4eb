use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::utils::now_timestamp;

/// Conversational style a broker persona is tuned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonalityType {
    Aggressive,
    Balanced,
    Conservative,
    Luxury,
}

impl fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonalityType::Aggressive => write!(f, "aggressive"),
            PersonalityType::Balanced => write!(f, "balanced"),
            PersonalityType::Conservative => write!(f, "conservative"),
            PersonalityType::Luxury => write!(f, "luxury"),
        }
    }
}

// Convert from string (for SQLx)
impl From<String> for PersonalityType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "aggressive" => PersonalityType::Aggressive,
            "conservative" => PersonalityType::Conservative,
            "luxury" => PersonalityType::Luxury,
            _ => PersonalityType::Balanced,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broker {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub role: String,
    pub photo_url: Option<String>,
    pub personality_type: PersonalityType,
    pub communication_style: Option<String>,
    pub approach_style: Option<String>,
    pub voice_description: Option<String>,
    pub current_workload: i32,
    pub active_conversations: i32,
    pub max_concurrent_chats: i32,
    pub is_available: bool,
    pub is_active: bool,
    pub last_active_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Broker {
    pub fn new(
        id: String,
        name: String,
        role: String,
        personality_type: PersonalityType,
        max_concurrent_chats: i32,
    ) -> Self {
        let now = now_timestamp();
        let slug = slugify(&name);
        Self {
            id,
            name,
            slug,
            role,
            photo_url: None,
            personality_type,
            communication_style: None,
            approach_style: None,
            voice_description: None,
            current_workload: 0,
            active_conversations: 0,
            max_concurrent_chats: max_concurrent_chats.max(1),
            is_available: true,
            is_active: true,
            last_active_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Active, flagged available and below its concurrent chat limit
    pub fn has_capacity(&self) -> bool {
        self.is_active && self.is_available && self.current_workload < self.max_concurrent_chats
    }

    pub fn remaining_capacity(&self) -> i32 {
        (self.max_concurrent_chats - self.current_workload).max(0)
    }
}

fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(|part| {
            part.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Broker fields safe to show to leads
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerProfile {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub role: String,
    pub photo_url: Option<String>,
    pub personality_type: PersonalityType,
    pub communication_style: Option<String>,
    pub approach_style: Option<String>,
    pub voice_description: Option<String>,
    pub is_available: bool,
}

impl From<&Broker> for BrokerProfile {
    fn from(broker: &Broker) -> Self {
        Self {
            id: broker.id.clone(),
            name: broker.name.clone(),
            slug: broker.slug.clone(),
            role: broker.role.clone(),
            photo_url: broker.photo_url.clone(),
            personality_type: broker.personality_type,
            communication_style: broker.communication_style.clone(),
            approach_style: broker.approach_style.clone(),
            voice_description: broker.voice_description.clone(),
            is_available: broker.is_available,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerDirectoryEntry {
    #[serde(flatten)]
    pub profile: BrokerProfile,
    pub current_workload: i32,
    pub max_concurrent_chats: i32,
}

impl From<&Broker> for BrokerDirectoryEntry {
    fn from(broker: &Broker) -> Self {
        Self {
            profile: BrokerProfile::from(broker),
            current_workload: broker.current_workload,
            max_concurrent_chats: broker.max_concurrent_chats,
        }
    }
}
