pub mod message_tracking;
pub mod utils;

pub use message_tracking::*;
pub use utils::*;
