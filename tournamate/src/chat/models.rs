//! Chat data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tournament::{TournamentId, UserId};

/// Chat message ID type
pub type MessageId = i64;

/// Author name used when the sender has no profile
pub const DEFAULT_AUTHOR_NAME: &str = "Player";

/// Stored chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub tournament_id: TournamentId,
    pub user_id: UserId,
    pub author_name: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Message handed to the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
    pub tournament_id: TournamentId,
    pub user_id: UserId,
    pub author_name: String,
    pub body: String,
}
