//! Webhook publisher.

use async_trait::async_trait;
use std::time::Duration;

use super::{DomainEvent, EventPublisher, PublishError};

/// Default request timeout for webhook deliveries
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(3);

/// POSTs each event as JSON to a fixed URL
#[derive(Debug, Clone)]
pub struct WebhookPublisher {
    client: reqwest::Client,
    url: String,
    secret: Option<String>,
}

impl WebhookPublisher {
    /// Create a publisher for `url`.
    ///
    /// When `secret` is set it is sent as a bearer token.
    pub fn new(
        url: impl Into<String>,
        secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            secret,
        })
    }

    /// Target URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EventPublisher for WebhookPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        let mut request = self.client.post(&self.url).json(event);
        if let Some(secret) = &self.secret {
            request = request.bearer_auth(secret);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Rejected(status.as_u16()));
        }

        log::debug!("Delivered {} to webhook", event.name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::UserId;

    #[tokio::test]
    async fn test_unreachable_webhook_is_transport_error() {
        let publisher = WebhookPublisher::new(
            "http://127.0.0.1:9/hook",
            Some("secret".to_string()),
            Duration::from_millis(500),
        )
        .unwrap();
        let err = publisher
            .publish(&DomainEvent::TournamentJoined {
                tournament_id: 1,
                user_id: UserId::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Transport(_)));
    }
}
