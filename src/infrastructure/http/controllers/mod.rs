pub mod brokers;
pub mod calculators;
pub mod conversations;
pub mod conversion;
pub mod health;
pub mod messages;
pub mod webhooks;
