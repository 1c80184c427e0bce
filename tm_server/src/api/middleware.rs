//! Authentication middleware for protected endpoints.
//!
//! Extracts and verifies the identity provider's access token from the
//! `Authorization` header, then injects [`AuthUser`] into request extensions.
//!
//! # Extracting the user
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use tm_server::api::middleware::AuthUser;
//!
//! async fn protected_handler(Extension(user): Extension<AuthUser>) -> String {
//!     format!("Authenticated as user {}", user.id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tournamate::{auth::AuthError, tournament::UserId};

use super::AppState;
use super::error::ApiError;
use super::request_id::RequestId;
use crate::logging::log_security_event;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Option<String>,
}

/// Authentication middleware that validates JWT tokens and injects the user.
///
/// - **Success**: Injects [`AuthUser`] into request extensions and calls the next handler
/// - **Missing header or wrong scheme**: `401 Unauthorized`
/// - **Invalid/expired token**: `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string());

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let Some(token) = token else {
        log_security_event("missing_token", request_id.as_deref(), "No bearer token");
        return Err(AuthError::MissingToken.into());
    };

    match state.verifier.verify(token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser {
                id: claims.sub,
                email: claims.email,
            });
            Ok(next.run(request).await)
        }
        Err(e) => {
            log_security_event("invalid_token", request_id.as_deref(), &e.to_string());
            Err(e.into())
        }
    }
}
