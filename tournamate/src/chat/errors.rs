//! Chat error types.

use thiserror::Error;

use crate::db::StoreError;
use crate::tournament::TournamentId;

/// Chat errors
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("Only participants can use this tournament's chat")]
    NotParticipant,

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Message is too long ({len} characters, at most {max})")]
    MessageTooLong { max: usize, len: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ChatError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            ChatError::NotFound(_) => "Tournament not found".to_string(),
            ChatError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::NotFound(_) => "not_found",
            ChatError::NotParticipant => "not_participant",
            ChatError::EmptyMessage => "empty_message",
            ChatError::MessageTooLong { .. } => "message_too_long",
            ChatError::Store(_) => "internal",
        }
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
