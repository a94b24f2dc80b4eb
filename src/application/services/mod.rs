pub mod assignment_service;
pub mod conversation_service;

pub use assignment_service::AssignmentService;
pub use conversation_service::{ConversationService, ConversationSettings};
