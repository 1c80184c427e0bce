//! Tournament manager for creating, listing and joining tournaments.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::code::{CodeAllocator, normalize_code};
use super::errors::{TournamentError, TournamentResult};
use super::models::{
    AdmitOutcome, JoinedTournament, Membership, Participant, Tournament, TournamentConfig,
    TournamentId, TournamentRecord, TournamentStatus, TournamentSummary, TournamentView, UserId,
};
use crate::db::{
    MembershipRepository, ProfileRepository, Repositories, StoreError, TournamentRepository,
};
use crate::events::{DomainEvent, EventPublisher, publish_in_background};

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    tournaments: Arc<dyn TournamentRepository>,
    memberships: Arc<dyn MembershipRepository>,
    profiles: Arc<dyn ProfileRepository>,
    publisher: Arc<dyn EventPublisher>,
    allocator: CodeAllocator,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(
        repos: &Repositories,
        publisher: Arc<dyn EventPublisher>,
        allocator: CodeAllocator,
    ) -> Self {
        Self {
            tournaments: repos.tournaments.clone(),
            memberships: repos.memberships.clone(),
            profiles: repos.profiles.clone(),
            publisher,
            allocator,
        }
    }

    /// Allocate a registration code for a tournament seeded by `seed`.
    ///
    /// The code is free at the time of the check only; creation relies on
    /// the unique constraint to catch later collisions.
    pub async fn allocate_code(&self, seed: &str) -> TournamentResult<String> {
        Ok(self.allocator.allocate(self.tournaments.as_ref(), seed).await?)
    }

    /// Create a new tournament in the `upcoming` status.
    ///
    /// Retries with a fresh code whenever the insert hits a code collision.
    pub async fn create_tournament(
        &self,
        created_by: UserId,
        config: TournamentConfig,
    ) -> TournamentResult<Tournament> {
        config.validate().map_err(TournamentError::InvalidInput)?;

        let attempts = self.allocator.policy().max_attempts.max(1);
        for attempt in 1..=attempts {
            let registration_code = self.allocate_code(&config.game).await?;
            let record = TournamentRecord {
                registration_code,
                status: TournamentStatus::Upcoming,
                created_by,
                config: config.clone(),
            };

            match self.tournaments.insert_tournament(&record).await {
                Ok(tournament) => {
                    log::info!(
                        "Created tournament {} '{}' with code {}",
                        tournament.id,
                        tournament.config.title,
                        tournament.registration_code
                    );
                    self.notify(DomainEvent::TournamentCreated {
                        tournament_id: tournament.id,
                        registration_code: tournament.registration_code.clone(),
                        created_by,
                        title: tournament.config.title.clone(),
                    });
                    return Ok(tournament);
                }
                Err(StoreError::DuplicateCode(code)) => {
                    log::debug!(
                        "Code {} collided on insert (attempt {}/{})",
                        code,
                        attempt,
                        attempts
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        log::warn!("Gave up creating tournament after {} code collisions", attempts);
        Err(TournamentError::AllocationExhausted { attempts })
    }

    /// Join a tournament by id.
    ///
    /// Fails with `AlreadyJoined` or `TournamentFull`; the capacity check and
    /// the insert are a single atomic step in the repository.
    pub async fn join_by_tournament(
        &self,
        user_id: UserId,
        tournament_id: TournamentId,
    ) -> TournamentResult<Membership> {
        match self.memberships.admit_member(tournament_id, user_id).await? {
            AdmitOutcome::Admitted(membership) => {
                log::info!("User {} joined tournament {}", user_id, tournament_id);
                self.notify(DomainEvent::TournamentJoined {
                    tournament_id,
                    user_id,
                });
                Ok(membership)
            }
            AdmitOutcome::AlreadyMember => Err(TournamentError::AlreadyJoined),
            AdmitOutcome::Full => Err(TournamentError::TournamentFull),
            AdmitOutcome::TournamentMissing => Err(TournamentError::NotFound(tournament_id)),
        }
    }

    /// Join a tournament through its registration code (case-insensitive)
    pub async fn join_by_code(&self, user_id: UserId, code: &str) -> TournamentResult<Membership> {
        let code = normalize_code(code);
        let tournament = self
            .tournaments
            .find_by_code(&code)
            .await?
            .ok_or_else(|| TournamentError::InvalidCode(code.clone()))?;

        if !tournament.status.accepts_joins() {
            return Err(TournamentError::RegistrationClosed(tournament.status));
        }

        self.join_by_tournament(user_id, tournament.id).await
    }

    /// Get a tournament by id
    pub async fn get_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Tournament> {
        self.tournaments
            .find_by_id(tournament_id)
            .await?
            .ok_or(TournamentError::NotFound(tournament_id))
    }

    /// Look up a tournament by registration code (case-insensitive)
    pub async fn find_by_code(&self, code: &str) -> TournamentResult<Option<Tournament>> {
        Ok(self.tournaments.find_by_code(&normalize_code(code)).await?)
    }

    /// Tournament with its roster, in join order
    pub async fn view_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<TournamentView> {
        let tournament = self.get_tournament(tournament_id).await?;
        let members = self.memberships.list_members(tournament_id).await?;

        let user_ids: Vec<UserId> = members.iter().map(|m| m.user_id).collect();
        let mut profiles: HashMap<UserId, _> = self
            .profiles
            .find_profiles(&user_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let participants: Vec<Participant> = members
            .into_iter()
            .map(|m| Participant {
                user_id: m.user_id,
                joined_at: m.joined_at,
                profile: profiles.remove(&m.user_id),
            })
            .collect();

        Ok(TournamentView {
            tournament,
            participant_count: participants.len() as u32,
            participants,
        })
    }

    /// Upcoming tournaments, earliest start first
    pub async fn list_upcoming(&self) -> TournamentResult<Vec<TournamentSummary>> {
        let tournaments = self
            .tournaments
            .list_by_status(TournamentStatus::Upcoming)
            .await?;
        self.summarize_all(tournaments).await
    }

    /// Upcoming tournaments the user has not joined
    pub async fn list_available(
        &self,
        user_id: UserId,
    ) -> TournamentResult<Vec<TournamentSummary>> {
        let joined: HashSet<TournamentId> = self
            .memberships
            .list_for_user(user_id)
            .await?
            .into_iter()
            .map(|m| m.tournament_id)
            .collect();

        let tournaments = self
            .tournaments
            .list_by_status(TournamentStatus::Upcoming)
            .await?
            .into_iter()
            .filter(|t| !joined.contains(&t.id))
            .collect();
        self.summarize_all(tournaments).await
    }

    /// Tournaments the user joined, most recent join first
    pub async fn list_joined(&self, user_id: UserId) -> TournamentResult<Vec<JoinedTournament>> {
        let memberships = self.memberships.list_for_user(user_id).await?;

        let mut joined = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let Some(tournament) = self.tournaments.find_by_id(membership.tournament_id).await?
            else {
                continue;
            };
            joined.push(JoinedTournament {
                summary: self.summarize(tournament).await?,
                joined_at: membership.joined_at,
            });
        }
        joined.sort_by(|a, b| b.joined_at.cmp(&a.joined_at));
        Ok(joined)
    }

    /// Tournaments the user created, newest first
    pub async fn list_created(&self, user_id: UserId) -> TournamentResult<Vec<TournamentSummary>> {
        let tournaments = self.tournaments.list_created_by(user_id).await?;
        self.summarize_all(tournaments).await
    }

    /// Whether the user created or joined the tournament
    pub async fn is_participant(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> TournamentResult<bool> {
        let tournament = self.get_tournament(tournament_id).await?;
        if tournament.created_by == user_id {
            return Ok(true);
        }
        Ok(self
            .memberships
            .find_membership(tournament_id, user_id)
            .await?
            .is_some())
    }

    async fn summarize(&self, tournament: Tournament) -> TournamentResult<TournamentSummary> {
        let participant_count = self.memberships.count_members(tournament.id).await?;
        Ok(TournamentSummary {
            tournament,
            participant_count,
        })
    }

    async fn summarize_all(
        &self,
        tournaments: Vec<Tournament>,
    ) -> TournamentResult<Vec<TournamentSummary>> {
        let mut summaries = Vec::with_capacity(tournaments.len());
        for tournament in tournaments {
            summaries.push(self.summarize(tournament).await?);
        }
        Ok(summaries)
    }

    fn notify(&self, event: DomainEvent) {
        publish_in_background(&self.publisher, event);
    }
}
