//! Tournament chat manager.
//!
//! Messages are stored and fetched on demand; clients poll with the id of the
//! last message they have seen.

use std::sync::Arc;

use super::errors::{ChatError, ChatResult};
use super::models::{ChatMessage, DEFAULT_AUTHOR_NAME, MessageId, NewChatMessage};
use crate::db::{
    ChatRepository, MembershipRepository, ProfileRepository, Repositories, TournamentRepository,
};
use crate::events::{DomainEvent, EventPublisher, publish_in_background};
use crate::tournament::{TournamentId, UserId};

/// Default longest message, in characters
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 1000;

/// Page size used when the caller gives none
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 200;

/// Chat manager
#[derive(Clone)]
pub struct ChatManager {
    tournaments: Arc<dyn TournamentRepository>,
    memberships: Arc<dyn MembershipRepository>,
    messages: Arc<dyn ChatRepository>,
    profiles: Arc<dyn ProfileRepository>,
    publisher: Arc<dyn EventPublisher>,
    max_message_len: usize,
}

impl ChatManager {
    /// Create a new chat manager
    pub fn new(
        repos: &Repositories,
        publisher: Arc<dyn EventPublisher>,
        max_message_len: usize,
    ) -> Self {
        Self {
            tournaments: repos.tournaments.clone(),
            memberships: repos.memberships.clone(),
            messages: repos.chat.clone(),
            profiles: repos.profiles.clone(),
            publisher,
            max_message_len,
        }
    }

    /// Post a message to a tournament's chat
    pub async fn send_message(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
        body: &str,
    ) -> ChatResult<ChatMessage> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let len = body.chars().count();
        if len > self.max_message_len {
            return Err(ChatError::MessageTooLong {
                max: self.max_message_len,
                len,
            });
        }

        self.ensure_participant(tournament_id, user_id).await?;

        let author_name = self
            .profiles
            .find_profile(user_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_else(|| DEFAULT_AUTHOR_NAME.to_string());

        let message = self
            .messages
            .insert_message(&NewChatMessage {
                tournament_id,
                user_id,
                author_name,
                body: body.to_string(),
            })
            .await?;

        log::debug!(
            "Message {} posted to tournament {} by {}",
            message.id,
            tournament_id,
            user_id
        );

        publish_in_background(
            &self.publisher,
            DomainEvent::MessageSent {
                tournament_id,
                message_id: message.id,
                user_id,
            },
        );

        Ok(message)
    }

    /// Messages newer than `after`, oldest first
    pub async fn list_messages(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
        after: Option<MessageId>,
        limit: Option<u32>,
    ) -> ChatResult<Vec<ChatMessage>> {
        self.ensure_participant(tournament_id, user_id).await?;

        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        Ok(self
            .messages
            .list_messages(tournament_id, after, limit)
            .await?)
    }

    async fn ensure_participant(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> ChatResult<()> {
        let tournament = self
            .tournaments
            .find_by_id(tournament_id)
            .await?
            .ok_or(ChatError::NotFound(tournament_id))?;

        if tournament.created_by == user_id {
            return Ok(());
        }

        match self
            .memberships
            .find_membership(tournament_id, user_id)
            .await?
        {
            Some(_) => Ok(()),
            None => Err(ChatError::NotParticipant),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingPublisher;
    use crate::profile::ProfileUpdate;
    use crate::tournament::{TournamentConfig, TournamentRecord, TournamentStatus};
    use chrono::Utc;

    struct Fixture {
        chat: ChatManager,
        repos: Repositories,
        publisher: Arc<RecordingPublisher>,
        tournament_id: TournamentId,
        creator: UserId,
    }

    async fn fixture() -> Fixture {
        let repos = Repositories::in_memory();
        let publisher = Arc::new(RecordingPublisher::new());
        let creator = UserId::new_v4();
        let tournament = repos
            .tournaments
            .insert_tournament(&TournamentRecord {
                registration_code: "GOLF-2024XY".to_string(),
                status: TournamentStatus::Upcoming,
                created_by: creator,
                config: TournamentConfig {
                    title: "Member Guest".to_string(),
                    description: None,
                    game: "Golf".to_string(),
                    location: "North Course".to_string(),
                    start_at: Utc::now(),
                    end_at: None,
                    prize_pool: None,
                    rules: None,
                    max_participants: 4,
                },
            })
            .await
            .unwrap();

        Fixture {
            chat: ChatManager::new(&repos, publisher.clone(), 20),
            repos,
            publisher,
            tournament_id: tournament.id,
            creator,
        }
    }

    #[tokio::test]
    async fn test_creator_can_post_with_default_author() {
        let f = fixture().await;
        let message = f
            .chat
            .send_message(f.tournament_id, f.creator, "  Tee times at 9  ")
            .await
            .unwrap();
        assert_eq!(message.body, "Tee times at 9");
        assert_eq!(message.author_name, DEFAULT_AUTHOR_NAME);
        assert_eq!(f.publisher.wait_for_events(1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_member_author_name_from_profile() {
        let f = fixture().await;
        let member = UserId::new_v4();
        f.repos
            .memberships
            .admit_member(f.tournament_id, member)
            .await
            .unwrap();
        f.repos
            .profiles
            .upsert_profile(
                member,
                &ProfileUpdate {
                    name: "Lee".to_string(),
                    email: "lee@example.com".to_string(),
                    phone: None,
                    handicap: None,
                },
            )
            .await
            .unwrap();

        let message = f
            .chat
            .send_message(f.tournament_id, member, "hi")
            .await
            .unwrap();
        assert_eq!(message.author_name, "Lee");
    }

    #[tokio::test]
    async fn test_outsider_rejected() {
        let f = fixture().await;
        let outsider = UserId::new_v4();
        let err = f
            .chat
            .send_message(f.tournament_id, outsider, "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::NotParticipant));

        let err = f
            .chat
            .list_messages(f.tournament_id, outsider, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::NotParticipant));
    }

    #[tokio::test]
    async fn test_body_validation() {
        let f = fixture().await;
        let err = f
            .chat
            .send_message(f.tournament_id, f.creator, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));

        let err = f
            .chat
            .send_message(f.tournament_id, f.creator, &"x".repeat(21))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::MessageTooLong { max: 20, len: 21 }));
    }

    #[tokio::test]
    async fn test_unknown_tournament() {
        let f = fixture().await;
        let err = f
            .chat
            .send_message(999, f.creator, "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::NotFound(999)));
    }

    #[tokio::test]
    async fn test_polling_after_last_seen() {
        let f = fixture().await;
        let first = f
            .chat
            .send_message(f.tournament_id, f.creator, "one")
            .await
            .unwrap();
        f.chat
            .send_message(f.tournament_id, f.creator, "two")
            .await
            .unwrap();

        let newer = f
            .chat
            .list_messages(f.tournament_id, f.creator, Some(first.id), None)
            .await
            .unwrap();
        assert_eq!(newer.len(), 1);
        assert_eq!(newer[0].body, "two");

        let clamped = f
            .chat
            .list_messages(f.tournament_id, f.creator, None, Some(0))
            .await
            .unwrap();
        assert_eq!(clamped.len(), 1);
    }
}
