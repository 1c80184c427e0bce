//! Authentication error types.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token on the request
    #[error("Missing bearer token")]
    MissingToken,

    /// Token has expired
    #[error("Token expired")]
    TokenExpired,

    /// Signature, audience or claims did not check out
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token could not be signed
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Secret too short to be used
    #[error("JWT secret must be at least {min} characters")]
    WeakSecret { min: usize },
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken(err.to_string()),
        }
    }
}

impl AuthError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            AuthError::MissingToken => "Authentication required".to_string(),
            AuthError::TokenExpired => "Token expired".to_string(),
            AuthError::InvalidToken(_) => "Invalid token".to_string(),
            AuthError::Signing(_) | AuthError::WeakSecret { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
