use crate::domain::entities::BrokerAssignment;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

/// Repository for broker assignment bookkeeping
///
/// Workload counters only change through these operations.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Reserve capacity on the assignment's broker and record the assignment atomically.
    ///
    /// Returns `false` without side effects when the broker has no remaining capacity.
    /// An existing record for the conversation is updated in place and its previous
    /// broker released.
    async fn assign_broker(&self, assignment: &BrokerAssignment) -> ApiResult<bool>;

    async fn get_assignment(&self, conversation_id: i64) -> ApiResult<Option<BrokerAssignment>>;

    /// Mark conversation and assignment completed and release broker capacity. Idempotent.
    async fn complete_conversation(&self, conversation_id: i64) -> ApiResult<CompletionRecord>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRecord {
    /// Conversation moved from active to completed by this call
    pub completed: bool,
    pub released_broker_id: Option<String>,
}
