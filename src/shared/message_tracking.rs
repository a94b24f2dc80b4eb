use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const DEFAULT_MAX_HASHES: usize = 10;
const DEFAULT_MAX_MESSAGE_IDS: usize = 20;
const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

struct TrackedConversation {
    hashes: VecDeque<String>,
    message_ids: VecDeque<String>,
    last_activity: Instant,
}

impl TrackedConversation {
    fn new() -> Self {
        Self {
            hashes: VecDeque::new(),
            message_ids: VecDeque::new(),
            last_activity: Instant::now(),
        }
    }
}

/// Remember the last few messages posted per conversation, most recent last.
fn remember(list: &mut VecDeque<String>, value: String, capacity: usize) {
    if let Some(pos) = list.iter().position(|v| *v == value) {
        list.remove(pos);
    }
    list.push_back(value);
    while list.len() > capacity {
        list.pop_front();
    }
}

/// Recognises webhook notifications for messages the service sent itself.
///
/// Each conversation keeps a small LRU of content fingerprints and platform
/// message ids. Conversations idle longer than the TTL are forgotten.
#[derive(Clone)]
pub struct BotMessageTracker {
    conversations: Arc<RwLock<HashMap<i64, TrackedConversation>>>,
    max_hashes: usize,
    max_message_ids: usize,
    ttl: Duration,
}

impl BotMessageTracker {
    pub fn new() -> Self {
        Self::with_config(DEFAULT_MAX_HASHES, DEFAULT_MAX_MESSAGE_IDS, DEFAULT_TTL)
    }

    pub fn with_config(max_hashes: usize, max_message_ids: usize, ttl: Duration) -> Self {
        Self {
            conversations: Arc::new(RwLock::new(HashMap::new())),
            max_hashes: max_hashes.max(1),
            max_message_ids: max_message_ids.max(1),
            ttl,
        }
    }

    pub async fn track(&self, conversation_id: i64, content: &str, message_id: Option<&str>) {
        let hash = fingerprint(content);
        let mut conversations = self.conversations.write().await;
        let entry = conversations
            .entry(conversation_id)
            .or_insert_with(TrackedConversation::new);

        remember(&mut entry.hashes, hash, self.max_hashes);
        if let Some(id) = message_id.filter(|id| !id.is_empty()) {
            remember(&mut entry.message_ids, id.to_string(), self.max_message_ids);
        }
        entry.last_activity = Instant::now();
    }

    /// Message id match wins; otherwise compare normalised content
    pub async fn is_echo(&self, conversation_id: i64, content: &str, message_id: Option<&str>) -> bool {
        let conversations = self.conversations.read().await;
        let Some(entry) = conversations.get(&conversation_id) else {
            return false;
        };
        if entry.last_activity.elapsed() > self.ttl {
            return false;
        }

        if let Some(id) = message_id {
            if entry.message_ids.iter().any(|known| known == id) {
                return true;
            }
        }

        let hash = fingerprint(content);
        entry.hashes.iter().any(|known| *known == hash)
    }

    /// Drops idle conversations, returning how many were removed
    pub async fn cleanup_expired(&self) -> usize {
        let mut conversations = self.conversations.write().await;
        let before = conversations.len();
        conversations.retain(|_, entry| entry.last_activity.elapsed() <= self.ttl);
        before - conversations.len()
    }

    pub async fn tracked_conversations(&self) -> usize {
        self.conversations.read().await.len()
    }
}

impl Default for BotMessageTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Trimmed, lowercased and whitespace-collapsed
pub fn normalise_content(content: &str) -> String {
    content
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// First 16 hex chars of the SHA-256 of the normalised content
pub fn fingerprint(content: &str) -> String {
    let digest = Sha256::digest(normalise_content(content).as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(16);
    encoded
}
