use crate::domain::entities::Broker;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait BrokerRepository: Send + Sync {
    async fn create_broker(&self, broker: &Broker) -> ApiResult<()>;
    async fn get_broker_by_id(&self, broker_id: &str) -> ApiResult<Option<Broker>>;
    /// All active brokers ordered by name
    async fn list_active_brokers(&self) -> ApiResult<Vec<Broker>>;
    /// Active, available brokers with spare capacity
    async fn list_assignable_brokers(&self) -> ApiResult<Vec<Broker>>;
    async fn count_brokers(&self) -> ApiResult<i64>;
}
