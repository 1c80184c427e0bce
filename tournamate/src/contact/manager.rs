//! Contact manager.

use std::sync::Arc;

use super::errors::{ContactError, ContactResult};
use super::models::{ContactMessage, ContactSubmission};
use crate::db::ContactRepository;

/// Stores contact form submissions
#[derive(Clone)]
pub struct ContactManager {
    contacts: Arc<dyn ContactRepository>,
}

impl ContactManager {
    pub fn new(contacts: Arc<dyn ContactRepository>) -> Self {
        Self { contacts }
    }

    /// Validate and store a contact message
    pub async fn submit_contact(
        &self,
        submission: ContactSubmission,
    ) -> ContactResult<ContactMessage> {
        let submission = submission
            .normalized()
            .map_err(ContactError::InvalidInput)?;
        let message = self.contacts.insert_contact(&submission).await?;
        log::info!("Stored contact message {} from {}", message.id, message.email);
        Ok(message)
    }
}
