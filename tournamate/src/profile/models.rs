//! User profile data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tournament::UserId;

/// Longest accepted display name, in characters
pub const MAX_NAME_LEN: usize = 100;

/// Accepted handicap range
pub const HANDICAP_RANGE: std::ops::RangeInclusive<i32> = -10..=54;

/// Profile of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub handicap: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a user may set on their own profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub handicap: Option<i32>,
}

impl ProfileUpdate {
    /// Trim and check the update, returning the cleaned copy
    pub fn normalized(&self) -> Result<Self, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(format!("Name must be at most {MAX_NAME_LEN} characters"));
        }

        let email = self.email.trim().to_lowercase();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err("A valid email address is required".to_string()),
        }

        if let Some(handicap) = self.handicap {
            if !HANDICAP_RANGE.contains(&handicap) {
                return Err(format!(
                    "Handicap must be between {} and {}",
                    HANDICAP_RANGE.start(),
                    HANDICAP_RANGE.end()
                ));
            }
        }

        let phone = self
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(Self {
            name: name.to_string(),
            email,
            phone,
            handicap: self.handicap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update() -> ProfileUpdate {
        ProfileUpdate {
            name: "  Jane Smith ".to_string(),
            email: " Jane@Example.com".to_string(),
            phone: Some("  ".to_string()),
            handicap: Some(8),
        }
    }

    #[test]
    fn test_normalized_trims_and_lowercases() {
        let clean = update().normalized().unwrap();
        assert_eq!(clean.name, "Jane Smith");
        assert_eq!(clean.email, "jane@example.com");
        assert_eq!(clean.phone, None);
        assert_eq!(clean.handicap, Some(8));
    }

    #[test]
    fn test_bad_email_rejected() {
        for email in ["", "jane", "@example.com", "jane@"] {
            let mut u = update();
            u.email = email.to_string();
            assert!(u.normalized().is_err(), "{email:?} should be rejected");
        }
    }

    #[test]
    fn test_handicap_out_of_range() {
        let mut u = update();
        u.handicap = Some(60);
        assert!(u.normalized().is_err());
        u.handicap = Some(-10);
        assert!(u.normalized().is_ok());
    }
}
