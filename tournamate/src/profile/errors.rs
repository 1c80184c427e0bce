//! Profile error types.

use thiserror::Error;

use crate::db::StoreError;
use crate::tournament::UserId;

/// Profile errors
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile not found for user {0}")]
    NotFound(UserId),

    #[error("Invalid profile: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProfileError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            ProfileError::NotFound(_) => "Profile not found".to_string(),
            ProfileError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ProfileError::NotFound(_) => "not_found",
            ProfileError::InvalidInput(_) => "invalid_input",
            ProfileError::Store(_) => "internal",
        }
    }
}

pub type ProfileResult<T> = Result<T, ProfileError>;
