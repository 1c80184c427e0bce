//! Tournament API handlers.
//!
//! Listing upcoming tournaments is public; everything else requires a bearer
//! token.
//!
//! # Examples
//!
//! Create a tournament:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/tournaments \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"title": "Spring Open", "game": "Golf", "location": "Pebble Creek",
//!        "start_at": "2026-04-01T09:00:00Z", "max_participants": 32}'
//! ```
//!
//! Join with a registration code:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/tournaments/join \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"code": "golf-4821qk"}'
//! ```

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tournamate::tournament::{
    JoinedTournament, Membership, Tournament, TournamentConfig, TournamentId, TournamentResult,
    TournamentSummary, TournamentView,
};

use super::AppState;
use super::error::ApiError;
use super::middleware::AuthUser;
use crate::metrics::{self, JoinVia};

#[derive(Debug, Deserialize)]
pub struct JoinByCodeRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct MyTournamentsResponse {
    pub created: Vec<TournamentSummary>,
    pub joined: Vec<JoinedTournament>,
}

/// List upcoming tournaments, earliest start first.
///
/// # Errors
///
/// - `500 Internal Server Error`: Storage error
pub async fn list_tournaments(
    State(state): State<AppState>,
) -> Result<Json<Vec<TournamentSummary>>, ApiError> {
    Ok(Json(state.tournament_manager.list_upcoming().await?))
}

/// Create a tournament owned by the caller.
///
/// Returns `201 Created` with the stored tournament, including its
/// `registration_code`.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid configuration
/// - `503 Service Unavailable`: No registration code could be allocated
pub async fn create_tournament(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(config): Json<TournamentConfig>,
) -> Result<(StatusCode, Json<Tournament>), ApiError> {
    let tournament = state
        .tournament_manager
        .create_tournament(user.id, config)
        .await?;
    metrics::tournaments_created_total();
    Ok((StatusCode::CREATED, Json(tournament)))
}

/// Upcoming tournaments the caller has not joined.
pub async fn list_available(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<TournamentSummary>>, ApiError> {
    Ok(Json(state.tournament_manager.list_available(user.id).await?))
}

/// Tournaments the caller created and joined.
pub async fn my_tournaments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MyTournamentsResponse>, ApiError> {
    let created = state.tournament_manager.list_created(user.id).await?;
    let joined = state.tournament_manager.list_joined(user.id).await?;
    Ok(Json(MyTournamentsResponse { created, joined }))
}

/// Tournament detail with roster.
///
/// # Errors
///
/// - `404 Not Found`: Tournament doesn't exist
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<TournamentView>, ApiError> {
    Ok(Json(
        state.tournament_manager.view_tournament(tournament_id).await?,
    ))
}

/// Join a tournament by id.
///
/// # Errors
///
/// - `404 Not Found`: Tournament doesn't exist
/// - `409 Conflict`: Already joined, or tournament full
pub async fn join_tournament(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Membership>, ApiError> {
    let result = state
        .tournament_manager
        .join_by_tournament(user.id, tournament_id)
        .await;
    record_join(JoinVia::Tournament, &result);
    Ok(Json(result?))
}

/// Join a tournament through its registration code (case-insensitive).
///
/// # Errors
///
/// - `404 Not Found`: No tournament has this code
/// - `409 Conflict`: Registration closed, already joined, or tournament full
pub async fn join_by_code(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<JoinByCodeRequest>,
) -> Result<Json<Membership>, ApiError> {
    let result = state
        .tournament_manager
        .join_by_code(user.id, &request.code)
        .await;
    record_join(JoinVia::Code, &result);
    Ok(Json(result?))
}

fn record_join(via: JoinVia, result: &TournamentResult<Membership>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::tournament_joins_total(via, outcome);
}
