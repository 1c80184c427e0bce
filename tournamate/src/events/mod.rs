//! Domain events published to the automation webhook.
//!
//! Publishing is best effort: managers hand each event to a background task
//! and never wait for delivery. Failed deliveries are logged.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::chat::MessageId;
use crate::tournament::{TournamentId, UserId};

#[cfg(any(test, feature = "test-support"))]
mod recording;
mod webhook;

#[cfg(any(test, feature = "test-support"))]
pub use recording::RecordingPublisher;
pub use webhook::{DEFAULT_WEBHOOK_TIMEOUT, WebhookPublisher};

/// Event emitted after a state change has been stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum DomainEvent {
    TournamentCreated {
        tournament_id: TournamentId,
        registration_code: String,
        created_by: UserId,
        title: String,
    },
    TournamentJoined {
        tournament_id: TournamentId,
        user_id: UserId,
    },
    MessageSent {
        tournament_id: TournamentId,
        message_id: MessageId,
        user_id: UserId,
    },
}

impl DomainEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::TournamentCreated { .. } => "tournament-created",
            DomainEvent::TournamentJoined { .. } => "tournament-joined",
            DomainEvent::MessageSent { .. } => "message-sent",
        }
    }
}

/// Event publishing errors
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Webhook rejected event with status {0}")]
    Rejected(u16),

    #[error("Publisher unavailable: {0}")]
    Unavailable(String),
}

/// Sink for domain events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError>;
}

/// Publisher that only logs events
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPublisher;

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        log::info!("Event {}: {:?}", event.name(), event);
        Ok(())
    }
}

/// Deliver `event` on a spawned task; the caller does not wait for it.
///
/// Must be called from within a Tokio runtime.
pub fn publish_in_background(publisher: &Arc<dyn EventPublisher>, event: DomainEvent) {
    let publisher = Arc::clone(publisher);
    tokio::spawn(async move {
        if let Err(e) = publisher.publish(&event).await {
            log::warn!("Failed to publish {}: {}", event.name(), e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_event_json_is_tagged() {
        let user = UserId::new_v4();
        let event = DomainEvent::TournamentJoined {
            tournament_id: 3,
            user_id: user,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "tournament-joined");
        assert_eq!(json["tournament_id"], 3);
        assert_eq!(json["user_id"], user.to_string());
        assert_eq!(json["event"], event.name());
    }

    #[tokio::test]
    async fn test_background_publish_does_not_block() {
        let publisher = Arc::new(RecordingPublisher::new().with_delay(Duration::from_secs(5)));
        let shared: Arc<dyn EventPublisher> = publisher.clone();
        let event = DomainEvent::TournamentJoined {
            tournament_id: 1,
            user_id: UserId::new_v4(),
        };

        let started = Instant::now();
        publish_in_background(&shared, event);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(publisher.events().is_empty());
    }

    #[tokio::test]
    async fn test_background_publish_failure_is_swallowed() {
        let publisher = Arc::new(RecordingPublisher::failing());
        let shared: Arc<dyn EventPublisher> = publisher.clone();
        let event = DomainEvent::MessageSent {
            tournament_id: 1,
            message_id: 2,
            user_id: UserId::new_v4(),
        };

        publish_in_background(&shared, event.clone());
        assert_eq!(publisher.wait_for_events(1).await, vec![event]);
    }
}
