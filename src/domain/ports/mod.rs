pub mod assignment_repository;
pub mod broker_repository;
pub mod chat_platform;
pub mod conversation_repository;
pub mod task_queue;
pub mod time_service;
