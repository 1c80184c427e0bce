//! Contact error types.

use thiserror::Error;

use crate::db::StoreError;

/// Contact errors
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Invalid contact message: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ContactError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            ContactError::InvalidInput(_) => self.to_string(),
            ContactError::Store(_) => "Internal server error".to_string(),
        }
    }

    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ContactError::InvalidInput(_) => "invalid_input",
            ContactError::Store(_) => "internal",
        }
    }
}

pub type ContactResult<T> = Result<T, ContactError>;
