//! Storage error types.

use std::time::Duration;
use thiserror::Error;

/// Name of the unique constraint guarding registration codes
pub const REGISTRATION_CODE_CONSTRAINT: &str = "tournaments_registration_code_key";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Operation exceeded its deadline
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Registration code unique constraint violated
    #[error("Registration code already in use: {0}")]
    DuplicateCode(String),
}

impl StoreError {
    /// Map an insert failure, recognising registration code collisions
    pub fn from_insert(err: sqlx::Error, code: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation()
                && db_err.constraint() == Some(REGISTRATION_CODE_CONSTRAINT)
            {
                return StoreError::DuplicateCode(code.to_string());
            }
        }
        StoreError::Database(err)
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
