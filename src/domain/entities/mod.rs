pub mod assignment;
pub mod broker;
pub mod chat_event;
pub mod conversation;
pub mod job;

pub use assignment::*;
pub use broker::*;
pub use chat_event::*;
pub use conversation::*;
pub use job::*;
