//! Tournament chat API handlers.
//!
//! Clients poll `GET .../messages?after=<last seen id>` for new messages.

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tournamate::{
    chat::{ChatMessage, MessageId},
    tournament::TournamentId,
};

use super::AppState;
use super::error::ApiError;
use super::middleware::AuthUser;
use crate::metrics;

#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    pub after: Option<MessageId>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

/// Messages newer than `after`, oldest first.
///
/// # Errors
///
/// - `403 Forbidden`: Caller neither created nor joined the tournament
/// - `404 Not Found`: Tournament doesn't exist
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tournament_id): Path<TournamentId>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = state
        .chat_manager
        .list_messages(tournament_id, user.id, query.after, query.limit)
        .await?;
    Ok(Json(messages))
}

/// Post a message.
///
/// # Errors
///
/// - `400 Bad Request`: Empty or over-long message
/// - `403 Forbidden`: Caller neither created nor joined the tournament
/// - `404 Not Found`: Tournament doesn't exist
pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let message = state
        .chat_manager
        .send_message(tournament_id, user.id, &request.body)
        .await?;
    metrics::chat_messages_total();
    Ok((StatusCode::CREATED, Json(message)))
}
