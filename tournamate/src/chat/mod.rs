//! Per-tournament chat.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{ChatError, ChatResult};
pub use manager::{ChatManager, DEFAULT_MAX_MESSAGE_LEN, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use models::{ChatMessage, DEFAULT_AUTHOR_NAME, MessageId, NewChatMessage};
