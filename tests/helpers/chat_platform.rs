use async_trait::async_trait;
use brokerdesk::domain::ports::chat_platform::ChatPlatform;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum ChatCall {
    Message { conversation_id: i64, content: String },
    Activity { conversation_id: i64, content: String },
    Attributes { conversation_id: i64, attributes: Value },
}

/// Chat platform double that records every outbound call
#[derive(Default)]
pub struct RecordingChatPlatform {
    calls: Mutex<Vec<ChatCall>>,
    next_id: AtomicU64,
}

impl RecordingChatPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn messages_for(&self, conversation_id: i64) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChatCall::Message {
                    conversation_id: id,
                    content,
                } if id == conversation_id => Some(content),
                _ => None,
            })
            .collect()
    }

    pub fn activities_for(&self, conversation_id: i64) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChatCall::Activity {
                    conversation_id: id,
                    content,
                } if id == conversation_id => Some(content),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatPlatform for RecordingChatPlatform {
    async fn send_message(&self, conversation_id: i64, content: &str) -> Result<Option<String>, String> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().unwrap().push(ChatCall::Message {
            conversation_id,
            content: content.to_string(),
        });
        Ok(Some(format!("msg-{}", id)))
    }

    async fn create_activity_message(&self, conversation_id: i64, content: &str) -> Result<(), String> {
        self.calls.lock().unwrap().push(ChatCall::Activity {
            conversation_id,
            content: content.to_string(),
        });
        Ok(())
    }

    async fn update_custom_attributes(&self, conversation_id: i64, attributes: Value) -> Result<(), String> {
        self.calls.lock().unwrap().push(ChatCall::Attributes {
            conversation_id,
            attributes,
        });
        Ok(())
    }
}
