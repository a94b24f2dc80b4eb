use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Direction of a chat platform message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Incoming,
    Outgoing,
    Activity,
    Unknown,
}

impl MessageKind {
    /// Accepts both the string and the numeric encodings
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => match s.as_str() {
                "incoming" => MessageKind::Incoming,
                "outgoing" | "template" => MessageKind::Outgoing,
                "activity" => MessageKind::Activity,
                _ => MessageKind::Unknown,
            },
            Value::Number(n) => match n.as_i64() {
                Some(0) => MessageKind::Incoming,
                Some(1) | Some(3) => MessageKind::Outgoing,
                Some(2) => MessageKind::Activity,
                _ => MessageKind::Unknown,
            },
            _ => MessageKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookSender {
    #[serde(rename = "type")]
    pub sender_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookMessage {
    pub id: Option<Value>,
    pub content: Option<String>,
    pub message_type: Option<Value>,
    pub private: Option<bool>,
    pub sender: Option<WebhookSender>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookConversation {
    pub id: Option<i64>,
    pub status: Option<String>,
}

/// Inbound webhook from the chat platform.
///
/// Message fields may appear at the root or nested under `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatWebhookEvent {
    pub event: String,
    pub id: Option<Value>,
    pub content: Option<String>,
    pub message_type: Option<Value>,
    pub private: Option<bool>,
    pub status: Option<String>,
    pub sender: Option<WebhookSender>,
    pub message: Option<WebhookMessage>,
    pub conversation: Option<WebhookConversation>,
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl ChatWebhookEvent {
    pub fn conversation_id(&self) -> Option<i64> {
        self.conversation.as_ref().and_then(|c| c.id)
    }

    pub fn content(&self) -> &str {
        self.content
            .as_deref()
            .or_else(|| self.message.as_ref().and_then(|m| m.content.as_deref()))
            .unwrap_or("")
    }

    pub fn message_id(&self) -> Option<String> {
        self.message
            .as_ref()
            .and_then(|m| m.id.as_ref())
            .or(self.id.as_ref())
            .and_then(id_to_string)
    }

    pub fn message_kind(&self) -> MessageKind {
        self.message
            .as_ref()
            .and_then(|m| m.message_type.as_ref())
            .or(self.message_type.as_ref())
            .map(MessageKind::from_value)
            .unwrap_or(MessageKind::Unknown)
    }

    pub fn is_private(&self) -> bool {
        self.private
            .or_else(|| self.message.as_ref().and_then(|m| m.private))
            .unwrap_or(false)
    }

    /// Missing sender or missing sender type counts as the contact
    pub fn is_from_contact(&self) -> bool {
        let sender = self
            .message
            .as_ref()
            .and_then(|m| m.sender.as_ref())
            .or(self.sender.as_ref());
        match sender.and_then(|s| s.sender_type.as_deref()) {
            Some(kind) => kind.eq_ignore_ascii_case("contact"),
            None => true,
        }
    }

    pub fn conversation_status(&self) -> Option<&str> {
        self.conversation
            .as_ref()
            .and_then(|c| c.status.as_deref())
            .or(self.status.as_deref())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum WebhookOutcome {
    Ignored { reason: String },
    Echo,
    Recorded,
    Completed,
}

impl WebhookOutcome {
    pub fn ignored(reason: &str) -> Self {
        WebhookOutcome::Ignored {
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackBotMessageRequest {
    pub conversation_id: Option<i64>,
    #[serde(alias = "message")]
    pub content: Option<String>,
    pub message_id: Option<Value>,
}

impl TrackBotMessageRequest {
    pub fn message_id(&self) -> Option<String> {
        self.message_id.as_ref().and_then(id_to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_message_fields_take_precedence() {
        let event: ChatWebhookEvent = serde_json::from_value(json!({
            "event": "message_created",
            "id": 10,
            "message_type": "incoming",
            "message": {"id": 11, "content": "hi", "message_type": 1, "sender": {"type": "user"}},
            "conversation": {"id": 99, "status": "open"}
        }))
        .unwrap();

        assert_eq!(event.conversation_id(), Some(99));
        assert_eq!(event.message_id().as_deref(), Some("11"));
        assert_eq!(event.message_kind(), MessageKind::Outgoing);
        assert_eq!(event.content(), "hi");
        assert!(!event.is_from_contact());
    }

    #[test]
    fn test_root_level_payload() {
        let event: ChatWebhookEvent = serde_json::from_value(json!({
            "event": "message_created",
            "id": "abc",
            "content": "I want to refinance",
            "message_type": "incoming",
            "conversation": {"id": 7}
        }))
        .unwrap();

        assert_eq!(event.message_kind(), MessageKind::Incoming);
        assert_eq!(event.message_id().as_deref(), Some("abc"));
        assert!(event.is_from_contact());
        assert!(!event.is_private());
    }

    #[test]
    fn test_outcome_serialises_with_status_tag() {
        let value = serde_json::to_value(WebhookOutcome::ignored("outgoing message")).unwrap();
        assert_eq!(value, json!({"status": "ignored", "reason": "outgoing message"}));
        assert_eq!(
            serde_json::to_value(WebhookOutcome::Echo).unwrap(),
            json!({"status": "echo"})
        );
    }
}
