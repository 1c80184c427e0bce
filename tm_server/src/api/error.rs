//! API error responses.
//!
//! Every failure leaves the server as `{"error": <message>, "code": <kind>}`.
//! Storage failures are logged in full and reported with a sanitized message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tournamate::{
    auth::AuthError, chat::ChatError, contact::ContactError, profile::ProfileError,
    tournament::TournamentError,
};

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                code: code.to_string(),
            },
        }
    }

    /// 401 with the given message
    pub fn unauthorized(error: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", error)
    }

    /// Machine-readable kind
    pub fn code(&self) -> &str {
        &self.body.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Status for an error kind shared by the library's error types
fn status_for(kind: &str) -> StatusCode {
    match kind {
        "already_joined" | "tournament_full" | "registration_closed" => StatusCode::CONFLICT,
        "invalid_code" | "not_found" => StatusCode::NOT_FOUND,
        "invalid_input" | "empty_message" | "message_too_long" => StatusCode::BAD_REQUEST,
        "not_participant" => StatusCode::FORBIDDEN,
        "allocation_exhausted" => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn from_kind(kind: &str, message: String, detail: &dyn std::fmt::Display) -> ApiError {
    let status = status_for(kind);
    if status.is_server_error() {
        tracing::error!(code = kind, "Request failed: {}", detail);
    }
    ApiError::new(status, kind, message)
}

impl From<TournamentError> for ApiError {
    fn from(err: TournamentError) -> Self {
        from_kind(err.kind(), err.client_message(), &err)
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        from_kind(err.kind(), err.client_message(), &err)
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        from_kind(err.kind(), err.client_message(), &err)
    }
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        from_kind(err.kind(), err.client_message(), &err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::unauthorized(err.client_message())
    }
}
