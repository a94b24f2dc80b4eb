use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::ChatwootConfig;
use crate::domain::ports::chat_platform::ChatPlatform;

/// Chatwoot REST client for agent messages, activity lines and custom attributes
pub struct ChatwootClient {
    http_client: Client,
    base_url: String,
    account_id: i64,
    api_token: String,
}

impl ChatwootClient {
    pub fn new(config: &ChatwootConfig) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            account_id: config.account_id,
            api_token: config.api_token.clone(),
        })
    }

    fn conversation_url(&self, conversation_id: i64, suffix: &str) -> String {
        format!(
            "{}/api/v1/accounts/{}/conversations/{}/{}",
            self.base_url, self.account_id, conversation_id, suffix
        )
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, String> {
        let response = self
            .http_client
            .post(url)
            .header("api_access_token", &self.api_token)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("Chatwoot request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("Chatwoot returned HTTP {}: {}", status, text));
        }

        // Some endpoints answer with an empty body
        Ok(response.json::<Value>().await.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl ChatPlatform for ChatwootClient {
    async fn send_message(&self, conversation_id: i64, content: &str) -> Result<Option<String>, String> {
        let url = self.conversation_url(conversation_id, "messages");
        let body = json!({
            "content": content,
            "message_type": "outgoing",
            "private": false,
        });

        let response = self.post(&url, &body).await?;
        let message_id = match response.get("id") {
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };

        tracing::debug!(
            "Sent message to Chatwoot conversation {} (message id {:?})",
            conversation_id,
            message_id
        );
        Ok(message_id)
    }

    async fn create_activity_message(&self, conversation_id: i64, content: &str) -> Result<(), String> {
        let url = self.conversation_url(conversation_id, "messages");
        let body = json!({
            "content": content,
            "message_type": "activity",
            "private": false,
        });

        self.post(&url, &body).await.map(|_| ())
    }

    async fn update_custom_attributes(&self, conversation_id: i64, attributes: Value) -> Result<(), String> {
        let url = self.conversation_url(conversation_id, "custom_attributes");
        let body = json!({ "custom_attributes": attributes });

        self.post(&url, &body).await.map(|_| ())
    }
}
