use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ports::chat_platform::ChatPlatform;

/// Stand-in when no chat platform is configured; every call succeeds and is logged
#[derive(Clone, Default)]
pub struct LoggingChatPlatform;

impl LoggingChatPlatform {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatPlatform for LoggingChatPlatform {
    async fn send_message(&self, conversation_id: i64, content: &str) -> Result<Option<String>, String> {
        tracing::info!("[chat {}] message: {}", conversation_id, content);
        Ok(None)
    }

    async fn create_activity_message(&self, conversation_id: i64, content: &str) -> Result<(), String> {
        tracing::info!("[chat {}] activity: {}", conversation_id, content);
        Ok(())
    }

    async fn update_custom_attributes(&self, conversation_id: i64, attributes: Value) -> Result<(), String> {
        tracing::info!("[chat {}] attributes: {}", conversation_id, attributes);
        Ok(())
    }
}
