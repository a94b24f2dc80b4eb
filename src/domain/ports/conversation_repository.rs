use crate::domain::entities::Conversation;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Fails with Conflict if the conversation id is already known
    async fn create_conversation(&self, conversation: &Conversation) -> ApiResult<()>;
    async fn get_conversation_by_id(&self, conversation_id: i64) -> ApiResult<Option<Conversation>>;
    /// Bump last_activity_at; returns false for unknown conversations
    async fn touch_conversation(&self, conversation_id: i64) -> ApiResult<bool>;
    async fn mark_welcome_sent(&self, conversation_id: i64) -> ApiResult<()>;
    /// Returns true only for the caller that flipped the flag
    async fn mark_busy_notice_sent(&self, conversation_id: i64) -> ApiResult<bool>;
    /// Active conversations with no activity since `before` (RFC 3339)
    async fn list_stale_conversation_ids(&self, before: &str) -> ApiResult<Vec<i64>>;
}
