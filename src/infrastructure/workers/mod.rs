pub mod job_queue;
pub mod job_worker;
pub mod worker_manager;

pub use job_queue::*;
pub use job_worker::*;
pub use worker_manager::*;
