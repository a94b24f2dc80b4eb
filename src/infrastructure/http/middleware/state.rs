use std::sync::Arc;

use crate::application::services::{AssignmentService, ConversationService};
use crate::domain::ports::task_queue::TaskQueue;
use crate::infrastructure::persistence::Database;
use crate::infrastructure::workers::WorkerManager;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub task_queue: Arc<dyn TaskQueue>,
    pub assignment_service: AssignmentService,
    pub conversation_service: ConversationService,
    pub worker_manager: Arc<WorkerManager>,
}
