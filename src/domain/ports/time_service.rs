use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Clock and sleep source for the job worker, swappable in tests
#[async_trait]
pub trait TimeService: Send + Sync {
    async fn sleep(&self, duration: Duration);

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
