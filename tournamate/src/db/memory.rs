//! In-memory repository implementation.
//!
//! Backs tests and the `memory` storage backend of the server. All state sits
//! behind one async mutex, so every trait method, including the conditional
//! membership insert, is atomic with respect to the others.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

use super::errors::{StoreError, StoreResult};
use super::repository::{
    ChatRepository, ContactRepository, MembershipRepository, ProfileRepository,
    TournamentRepository,
};
use crate::chat::{ChatMessage, MessageId, NewChatMessage};
use crate::contact::{ContactMessage, ContactMessageId, ContactSubmission};
use crate::profile::{ProfileUpdate, UserProfile};
use crate::tournament::{
    AdmitOutcome, Membership, Tournament, TournamentId, TournamentRecord, TournamentStatus,
    UserId,
};

#[derive(Default)]
struct MemoryState {
    tournaments: BTreeMap<TournamentId, Tournament>,
    codes: HashMap<String, TournamentId>,
    memberships: Vec<Membership>,
    messages: Vec<ChatMessage>,
    profiles: HashMap<UserId, UserProfile>,
    contacts: Vec<ContactMessage>,
    next_tournament_id: TournamentId,
    next_message_id: MessageId,
    next_contact_id: ContactMessageId,
}

impl MemoryState {
    fn member_count(&self, tournament_id: TournamentId) -> usize {
        self.memberships
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .count()
    }
}

/// Map-backed store implementing every repository trait
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentRepository for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_tournament(&self, record: &TournamentRecord) -> StoreResult<Tournament> {
        let mut state = self.state.lock().await;
        if state.codes.contains_key(&record.registration_code) {
            return Err(StoreError::DuplicateCode(record.registration_code.clone()));
        }

        state.next_tournament_id += 1;
        let tournament = Tournament {
            id: state.next_tournament_id,
            registration_code: record.registration_code.clone(),
            status: record.status,
            created_by: record.created_by,
            created_at: Utc::now(),
            config: record.config.clone(),
        };
        state
            .codes
            .insert(tournament.registration_code.clone(), tournament.id);
        state.tournaments.insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    async fn find_by_id(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        Ok(self.state.lock().await.tournaments.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> StoreResult<Option<Tournament>> {
        let state = self.state.lock().await;
        Ok(state
            .codes
            .get(code)
            .and_then(|id| state.tournaments.get(id))
            .cloned())
    }

    async fn list_by_status(&self, status: TournamentStatus) -> StoreResult<Vec<Tournament>> {
        let state = self.state.lock().await;
        let mut tournaments: Vec<Tournament> = state
            .tournaments
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect();
        tournaments.sort_by(|a, b| {
            a.config
                .start_at
                .cmp(&b.config.start_at)
                .then(a.id.cmp(&b.id))
        });
        Ok(tournaments)
    }

    async fn list_created_by(&self, user_id: UserId) -> StoreResult<Vec<Tournament>> {
        let state = self.state.lock().await;
        // Ids grow with insertion order, so reverse id order is newest first.
        Ok(state
            .tournaments
            .values()
            .rev()
            .filter(|t| t.created_by == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryStore {
    async fn find_membership(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> StoreResult<Option<Membership>> {
        let state = self.state.lock().await;
        Ok(state
            .memberships
            .iter()
            .find(|m| m.tournament_id == tournament_id && m.user_id == user_id)
            .cloned())
    }

    async fn count_members(&self, tournament_id: TournamentId) -> StoreResult<u32> {
        let state = self.state.lock().await;
        Ok(state.member_count(tournament_id) as u32)
    }

    async fn admit_member(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> StoreResult<AdmitOutcome> {
        let mut state = self.state.lock().await;

        let Some(max_participants) = state
            .tournaments
            .get(&tournament_id)
            .map(|t| t.config.max_participants as usize)
        else {
            return Ok(AdmitOutcome::TournamentMissing);
        };

        if state
            .memberships
            .iter()
            .any(|m| m.tournament_id == tournament_id && m.user_id == user_id)
        {
            return Ok(AdmitOutcome::AlreadyMember);
        }

        if state.member_count(tournament_id) >= max_participants {
            return Ok(AdmitOutcome::Full);
        }

        let membership = Membership {
            tournament_id,
            user_id,
            joined_at: Utc::now(),
        };
        state.memberships.push(membership.clone());
        Ok(AdmitOutcome::Admitted(membership))
    }

    async fn list_members(&self, tournament_id: TournamentId) -> StoreResult<Vec<Membership>> {
        let state = self.state.lock().await;
        Ok(state
            .memberships
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Membership>> {
        let state = self.state.lock().await;
        Ok(state
            .memberships
            .iter()
            .rev()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChatRepository for InMemoryStore {
    async fn insert_message(&self, message: &NewChatMessage) -> StoreResult<ChatMessage> {
        let mut state = self.state.lock().await;
        state.next_message_id += 1;
        let stored = ChatMessage {
            id: state.next_message_id,
            tournament_id: message.tournament_id,
            user_id: message.user_id,
            author_name: message.author_name.clone(),
            body: message.body.clone(),
            sent_at: Utc::now(),
        };
        state.messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_messages(
        &self,
        tournament_id: TournamentId,
        after: Option<MessageId>,
        limit: u32,
    ) -> StoreResult<Vec<ChatMessage>> {
        let state = self.state.lock().await;
        let after = after.unwrap_or(0);
        Ok(state
            .messages
            .iter()
            .filter(|m| m.tournament_id == tournament_id && m.id > after)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn upsert_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> StoreResult<UserProfile> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let created_at = state
            .profiles
            .get(&user_id)
            .map(|p| p.created_at)
            .unwrap_or(now);
        let profile = UserProfile {
            id: user_id,
            name: update.name.clone(),
            email: update.email.clone(),
            phone: update.phone.clone(),
            handicap: update.handicap,
            created_at,
            updated_at: now,
        };
        state.profiles.insert(user_id, profile.clone());
        Ok(profile)
    }

    async fn find_profile(&self, user_id: UserId) -> StoreResult<Option<UserProfile>> {
        Ok(self.state.lock().await.profiles.get(&user_id).cloned())
    }

    async fn find_profiles(&self, user_ids: &[UserId]) -> StoreResult<Vec<UserProfile>> {
        let state = self.state.lock().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| state.profiles.get(id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ContactRepository for InMemoryStore {
    async fn insert_contact(&self, submission: &ContactSubmission) -> StoreResult<ContactMessage> {
        let mut state = self.state.lock().await;
        state.next_contact_id += 1;
        let message = ContactMessage {
            id: state.next_contact_id,
            name: submission.name.clone(),
            email: submission.email.clone(),
            message: submission.message.clone(),
            submitted_at: Utc::now(),
        };
        state.contacts.push(message.clone());
        Ok(message)
    }

    async fn list_contacts(&self) -> StoreResult<Vec<ContactMessage>> {
        Ok(self.state.lock().await.contacts.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::TournamentConfig;

    fn record(code: &str, max_participants: u32) -> TournamentRecord {
        TournamentRecord {
            registration_code: code.to_string(),
            status: TournamentStatus::Upcoming,
            created_by: UserId::new_v4(),
            config: TournamentConfig {
                title: "Club Night".to_string(),
                description: None,
                game: "Chess".to_string(),
                location: "Hall A".to_string(),
                start_at: Utc::now(),
                end_at: None,
                prize_pool: None,
                rules: None,
                max_participants,
            },
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = InMemoryStore::new();
        let a = store.insert_tournament(&record("CHES-1000AA", 4)).await.unwrap();
        let b = store.insert_tournament(&record("CHES-1000AB", 4)).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let store = InMemoryStore::new();
        store.insert_tournament(&record("CHES-1000AA", 4)).await.unwrap();
        let err = store
            .insert_tournament(&record("CHES-1000AA", 4))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCode(code) if code == "CHES-1000AA"));
    }

    #[tokio::test]
    async fn test_code_lookup() {
        let store = InMemoryStore::new();
        let t = store.insert_tournament(&record("CHES-1000AA", 4)).await.unwrap();
        assert!(store.code_exists("CHES-1000AA").await.unwrap());
        assert!(!store.code_exists("CHES-1000AB").await.unwrap());
        assert_eq!(store.find_by_code("CHES-1000AA").await.unwrap(), Some(t));
    }

    #[tokio::test]
    async fn test_admit_member_outcomes() {
        let store = InMemoryStore::new();
        let t = store.insert_tournament(&record("CHES-1000AA", 1)).await.unwrap();
        let first = UserId::new_v4();

        assert!(matches!(
            store.admit_member(t.id, first).await.unwrap(),
            AdmitOutcome::Admitted(_)
        ));
        assert_eq!(
            store.admit_member(t.id, first).await.unwrap(),
            AdmitOutcome::AlreadyMember
        );
        assert_eq!(
            store.admit_member(t.id, UserId::new_v4()).await.unwrap(),
            AdmitOutcome::Full
        );
        assert_eq!(
            store.admit_member(999, first).await.unwrap(),
            AdmitOutcome::TournamentMissing
        );
        assert_eq!(store.count_members(t.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_messages_pages_after_id() {
        let store = InMemoryStore::new();
        let user = UserId::new_v4();
        for body in ["one", "two", "three"] {
            store
                .insert_message(&NewChatMessage {
                    tournament_id: 1,
                    user_id: user,
                    author_name: "Ann".to_string(),
                    body: body.to_string(),
                })
                .await
                .unwrap();
        }

        let page = store.list_messages(1, Some(1), 10).await.unwrap();
        let bodies: Vec<&str> = page.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["two", "three"]);

        let limited = store.list_messages(1, None, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert!(store.list_messages(2, None, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_profile_keeps_created_at() {
        let store = InMemoryStore::new();
        let user = UserId::new_v4();
        let update = ProfileUpdate {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            phone: None,
            handicap: None,
        };
        let first = store.upsert_profile(user, &update).await.unwrap();
        let second = store
            .upsert_profile(
                user,
                &ProfileUpdate {
                    name: "Ann B".to_string(),
                    ..update
                },
            )
            .await
            .unwrap();
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.name, "Ann B");
        assert_eq!(store.find_profiles(&[user, UserId::new_v4()]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_contacts_get_increasing_ids() {
        let store = InMemoryStore::new();
        let submission = ContactSubmission {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            message: "Hello".to_string(),
        };
        let first = store.insert_contact(&submission).await.unwrap();
        let second = store.insert_contact(&submission).await.unwrap();
        assert!(second.id > first.id);
        assert_eq!(store.list_contacts().await.unwrap(), vec![first, second]);
    }
}
