//! Contact data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contact message ID type
pub type ContactMessageId = i64;

/// Longest accepted sender name, in characters
pub const MAX_CONTACT_NAME_LEN: usize = 100;

/// Longest accepted message, in characters
pub const MAX_CONTACT_MESSAGE_LEN: usize = 5000;

/// Contact form as sent by a visitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactSubmission {
    /// Trim every field and lowercase the email, rejecting blank or oversized
    /// input
    pub fn normalized(&self) -> Result<Self, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        if name.chars().count() > MAX_CONTACT_NAME_LEN {
            return Err(format!(
                "Name must be at most {MAX_CONTACT_NAME_LEN} characters"
            ));
        }

        let email = self.email.trim().to_lowercase();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err("A valid email address is required".to_string()),
        }

        let message = self.message.trim();
        if message.is_empty() {
            return Err("Message is required".to_string());
        }
        if message.chars().count() > MAX_CONTACT_MESSAGE_LEN {
            return Err(format!(
                "Message must be at most {MAX_CONTACT_MESSAGE_LEN} characters"
            ));
        }

        Ok(Self {
            name: name.to_string(),
            email,
            message: message.to_string(),
        })
    }
}

/// Stored contact message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub name: String,
    pub email: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "  Jane Smith ".to_string(),
            email: " Jane@Example.COM ".to_string(),
            message: "\n  When does the spring league start?  ".to_string(),
        }
    }

    #[test]
    fn test_normalized_trims_and_lowercases() {
        let clean = submission().normalized().unwrap();
        assert_eq!(clean.name, "Jane Smith");
        assert_eq!(clean.email, "jane@example.com");
        assert_eq!(clean.message, "When does the spring league start?");
    }

    #[test]
    fn test_blank_fields_rejected() {
        let mut s = submission();
        s.name = "   ".to_string();
        assert_eq!(s.normalized().unwrap_err(), "Name is required");

        let mut s = submission();
        s.message = " \t ".to_string();
        assert_eq!(s.normalized().unwrap_err(), "Message is required");

        let mut s = submission();
        s.email = "jane".to_string();
        assert!(s.normalized().is_err());
    }

    #[test]
    fn test_message_length_limit() {
        let mut s = submission();
        s.message = "x".repeat(MAX_CONTACT_MESSAGE_LEN);
        assert!(s.normalized().is_ok());
        s.message.push('x');
        assert!(s.normalized().is_err());
    }
}
