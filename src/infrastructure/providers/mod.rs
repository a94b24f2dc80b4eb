pub mod chatwoot;
pub mod logging;

pub use chatwoot::ChatwootClient;
pub use logging::LoggingChatPlatform;
