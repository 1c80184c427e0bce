//! Profile manager.

use std::sync::Arc;

use super::errors::{ProfileError, ProfileResult};
use super::models::{ProfileUpdate, UserProfile};
use crate::db::ProfileRepository;
use crate::tournament::UserId;

/// Reads and writes the caller's own profile
#[derive(Clone)]
pub struct ProfileManager {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileManager {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Create or replace the user's profile
    pub async fn upsert_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> ProfileResult<UserProfile> {
        let update = update.normalized().map_err(ProfileError::InvalidInput)?;
        let profile = self.profiles.upsert_profile(user_id, &update).await?;
        log::info!("Saved profile for user {}", user_id);
        Ok(profile)
    }

    /// Get the user's profile
    pub async fn get_profile(&self, user_id: UserId) -> ProfileResult<UserProfile> {
        self.profiles
            .find_profile(user_id)
            .await?
            .ok_or(ProfileError::NotFound(user_id))
    }
}
