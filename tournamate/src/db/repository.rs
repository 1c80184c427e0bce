//! Repository trait definitions for testability and dependency injection.
//!
//! Each aggregate gets its own trait so managers depend only on what they
//! touch. [`Repositories`] bundles one implementation of each, either backed by
//! PostgreSQL or by the in-memory store.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use super::errors::StoreResult;
use super::memory::InMemoryStore;
use super::postgres::{
    PgChatRepository, PgContactRepository, PgMembershipRepository, PgProfileRepository,
    PgTournamentRepository,
};
use crate::chat::{ChatMessage, MessageId, NewChatMessage};
use crate::contact::{ContactMessage, ContactSubmission};
use crate::profile::{ProfileUpdate, UserProfile};
use crate::tournament::{
    AdmitOutcome, Membership, Tournament, TournamentId, TournamentRecord, TournamentStatus,
    UserId,
};

/// Trait for tournament repository operations
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Check the backing store is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Insert a tournament
    ///
    /// Fails with [`StoreError::DuplicateCode`](super::StoreError::DuplicateCode)
    /// when the registration code is already taken.
    async fn insert_tournament(&self, record: &TournamentRecord) -> StoreResult<Tournament>;

    /// Find tournament by ID
    async fn find_by_id(&self, id: TournamentId) -> StoreResult<Option<Tournament>>;

    /// Find tournament by exact (already normalized) registration code
    async fn find_by_code(&self, code: &str) -> StoreResult<Option<Tournament>>;

    /// Whether a registration code is in use
    async fn code_exists(&self, code: &str) -> StoreResult<bool> {
        Ok(self.find_by_code(code).await?.is_some())
    }

    /// List tournaments in a status, earliest start first
    async fn list_by_status(&self, status: TournamentStatus) -> StoreResult<Vec<Tournament>>;

    /// List tournaments created by a user, newest first
    async fn list_created_by(&self, user_id: UserId) -> StoreResult<Vec<Tournament>>;
}

/// Trait for membership repository operations
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Find the membership of a user in a tournament
    async fn find_membership(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> StoreResult<Option<Membership>>;

    /// Count members of a tournament
    async fn count_members(&self, tournament_id: TournamentId) -> StoreResult<u32>;

    /// Atomically insert a membership if the user is not yet a member and the
    /// tournament has a free place.
    async fn admit_member(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> StoreResult<AdmitOutcome>;

    /// List members of a tournament in join order
    async fn list_members(&self, tournament_id: TournamentId) -> StoreResult<Vec<Membership>>;

    /// List memberships of a user, most recent first
    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Membership>>;
}

/// Trait for chat repository operations
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Store a message
    async fn insert_message(&self, message: &NewChatMessage) -> StoreResult<ChatMessage>;

    /// Messages with `id > after`, oldest first, at most `limit`
    async fn list_messages(
        &self,
        tournament_id: TournamentId,
        after: Option<MessageId>,
        limit: u32,
    ) -> StoreResult<Vec<ChatMessage>>;
}

/// Trait for user profile repository operations
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Create or replace a profile
    async fn upsert_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> StoreResult<UserProfile>;

    /// Find profile by user ID
    async fn find_profile(&self, user_id: UserId) -> StoreResult<Option<UserProfile>>;

    /// Find all profiles among `user_ids`
    async fn find_profiles(&self, user_ids: &[UserId]) -> StoreResult<Vec<UserProfile>>;
}

/// Trait for contact message repository operations
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Store a contact message
    async fn insert_contact(&self, submission: &ContactSubmission) -> StoreResult<ContactMessage>;

    /// All contact messages, oldest first
    async fn list_contacts(&self) -> StoreResult<Vec<ContactMessage>>;
}

/// One implementation of every repository
#[derive(Clone)]
pub struct Repositories {
    pub tournaments: Arc<dyn TournamentRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub chat: Arc<dyn ChatRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub contacts: Arc<dyn ContactRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            tournaments: Arc::new(PgTournamentRepository::new(pool.clone())),
            memberships: Arc::new(PgMembershipRepository::new(pool.clone())),
            chat: Arc::new(PgChatRepository::new(pool.clone())),
            profiles: Arc::new(PgProfileRepository::new(pool.clone())),
            contacts: Arc::new(PgContactRepository::new(pool)),
        }
    }

    /// Repositories backed by a fresh [`InMemoryStore`]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }

    /// Repositories sharing an existing in-memory store
    pub fn from_store(store: Arc<InMemoryStore>) -> Self {
        Self {
            tournaments: store.clone(),
            memberships: store.clone(),
            chat: store.clone(),
            profiles: store.clone(),
            contacts: store,
        }
    }
}
