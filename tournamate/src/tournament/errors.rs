//! Tournament error types.

use thiserror::Error;

use super::models::{TournamentId, TournamentStatus};
use crate::db::StoreError;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    /// User already holds a membership
    #[error("You have already joined this tournament")]
    AlreadyJoined,

    /// Capacity reached
    #[error("Tournament is full")]
    TournamentFull,

    /// No tournament carries this registration code
    #[error("Invalid registration code: {0}")]
    InvalidCode(String),

    /// Tournament no longer accepts joins
    #[error("Tournament is not open for registration (status: {0})")]
    RegistrationClosed(TournamentStatus),

    /// Every code insert attempt collided
    #[error("Could not allocate a unique registration code after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },

    /// Tournament not found
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    /// Rejected input
    #[error("Invalid tournament: {0}")]
    InvalidInput(String),

    /// Storage error
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TournamentError {
    /// Get a client-safe error message
    ///
    /// Storage errors are sanitized and ids are not echoed back.
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Store(_) => "Internal server error".to_string(),
            TournamentError::NotFound(_) => "Tournament not found".to_string(),
            TournamentError::InvalidCode(_) => "Invalid registration code".to_string(),
            TournamentError::RegistrationClosed(_) => {
                "Tournament is not open for registration".to_string()
            }
            TournamentError::AllocationExhausted { .. } => {
                "Could not allocate a registration code, please try again".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            TournamentError::AlreadyJoined => "already_joined",
            TournamentError::TournamentFull => "tournament_full",
            TournamentError::InvalidCode(_) => "invalid_code",
            TournamentError::RegistrationClosed(_) => "registration_closed",
            TournamentError::AllocationExhausted { .. } => "allocation_exhausted",
            TournamentError::NotFound(_) => "not_found",
            TournamentError::InvalidInput(_) => "invalid_input",
            TournamentError::Store(_) => "internal",
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_join_failures_have_distinct_messages() {
        let errors = [
            TournamentError::AlreadyJoined,
            TournamentError::TournamentFull,
            TournamentError::InvalidCode("X".to_string()),
            TournamentError::RegistrationClosed(TournamentStatus::Completed),
        ];
        let mut messages: Vec<String> = errors.iter().map(|e| e.client_message()).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn test_store_errors_are_sanitized() {
        let err = TournamentError::from(StoreError::Timeout(Duration::from_secs(5)));
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(err.kind(), "internal");
    }

    #[test]
    fn test_invalid_code_does_not_echo_input() {
        let err = TournamentError::InvalidCode("GOLF-0000ZZ".to_string());
        assert!(!err.client_message().contains("GOLF"));
    }
}
