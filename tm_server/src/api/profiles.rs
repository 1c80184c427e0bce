//! Profile API handlers.

use axum::{
    Json,
    extract::{Extension, State},
};
use tournamate::profile::{ProfileUpdate, UserProfile};

use super::AppState;
use super::error::ApiError;
use super::middleware::AuthUser;

/// The caller's profile.
///
/// # Errors
///
/// - `404 Not Found`: No profile saved yet
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.profile_manager.get_profile(user.id).await?))
}

/// Create or replace the caller's profile.
///
/// # Errors
///
/// - `400 Bad Request`: Blank name, bad email or handicap out of range
pub async fn put_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(
        state.profile_manager.upsert_profile(user.id, update).await?,
    ))
}
