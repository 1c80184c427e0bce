//! Contact form handler.
//!
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/contact \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Jane", "email": "jane@example.com", "message": "Is there parking?"}'
//! ```

use axum::{Json, extract::State, http::StatusCode};
use tournamate::contact::{ContactMessage, ContactSubmission};

use super::AppState;
use super::error::ApiError;
use crate::metrics;

/// Store a contact message from any visitor.
///
/// Returns `201 Created` with the stored message.
///
/// # Errors
///
/// - `400 Bad Request`: Blank name or message, bad email, or message too long
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(submission): Json<ContactSubmission>,
) -> Result<(StatusCode, Json<ContactMessage>), ApiError> {
    let message = state.contact_manager.submit_contact(submission).await?;
    metrics::contact_messages_total();
    Ok((StatusCode::CREATED, Json(message)))
}
