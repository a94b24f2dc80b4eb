#![allow(dead_code)]
pub mod broker_helpers;
pub mod chat_platform;
pub mod test_db;

pub use broker_helpers::*;
pub use chat_platform::*;
pub use test_db::*;
