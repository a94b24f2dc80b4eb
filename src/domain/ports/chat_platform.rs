use async_trait::async_trait;
use serde_json::Value;

/// Outbound side of the hosted chat platform
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Post an outgoing agent message; returns the platform's message id when known
    async fn send_message(&self, conversation_id: i64, content: &str) -> Result<Option<String>, String>;

    /// Post a system activity line (e.g. "X joined the conversation")
    async fn create_activity_message(&self, conversation_id: i64, content: &str) -> Result<(), String>;

    /// Merge custom attributes into the conversation
    async fn update_custom_attributes(&self, conversation_id: i64, attributes: Value) -> Result<(), String>;
}
