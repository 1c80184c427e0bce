//! In-memory publisher for tests.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use super::{DomainEvent, EventPublisher, PublishError};

const WAIT_STEP: Duration = Duration::from_millis(5);
const WAIT_LIMIT: Duration = Duration::from_secs(2);

/// Publisher that keeps every event in memory.
///
/// [`RecordingPublisher::failing`] rejects every publish after recording it.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<DomainEvent>>,
    fail: bool,
    delay: Duration,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publisher whose `publish` always errors (events are still recorded)
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Sleep for `delay` before recording each event
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Events published so far
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Wait until at least `count` events arrived, or give up after two
    /// seconds, and return what was recorded.
    pub async fn wait_for_events(&self, count: usize) -> Vec<DomainEvent> {
        let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
        loop {
            let events = self.events();
            if events.len() >= count || tokio::time::Instant::now() >= deadline {
                return events;
            }
            tokio::time::sleep(WAIT_STEP).await;
        }
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
        if self.fail {
            return Err(PublishError::Unavailable(
                "recording publisher set to fail".to_string(),
            ));
        }
        Ok(())
    }
}
