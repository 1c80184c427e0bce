//! Tournament data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::profile::UserProfile;

/// Tournament ID type
pub type TournamentId = i64;

/// User ID type (subject of the identity provider's tokens)
pub type UserId = uuid::Uuid;

/// Longest accepted tournament title, in characters
pub const MAX_TITLE_LEN: usize = 120;

/// Upper bound on `max_participants`
pub const MAX_PARTICIPANTS_LIMIT: u32 = 10_000;

/// Tournament lifecycle status.
///
/// Only moves forward: `Upcoming → Ongoing → Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    /// Open for registration
    Upcoming,
    /// In progress
    Ongoing,
    /// Finished
    Completed,
}

impl TournamentStatus {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "upcoming",
            TournamentStatus::Ongoing => "ongoing",
            TournamentStatus::Completed => "completed",
        }
    }

    /// Whether new members may join in this status
    pub fn accepts_joins(&self) -> bool {
        matches!(self, TournamentStatus::Upcoming)
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(TournamentStatus::Upcoming),
            "ongoing" => Ok(TournamentStatus::Ongoing),
            "completed" => Ok(TournamentStatus::Completed),
            other => Err(format!("unknown tournament status: {other}")),
        }
    }
}

/// Tournament configuration supplied by the creator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Display title
    pub title: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Game or category name; seeds the registration code prefix
    pub game: String,
    /// Venue
    pub location: String,
    /// Scheduled start
    pub start_at: DateTime<Utc>,
    /// Scheduled end
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    /// Prize description
    #[serde(default)]
    pub prize_pool: Option<String>,
    /// House rules
    #[serde(default)]
    pub rules: Option<String>,
    /// Capacity
    pub max_participants: u32,
}

impl TournamentConfig {
    /// Check the configuration before it is persisted.
    ///
    /// Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(format!("Title must be at most {MAX_TITLE_LEN} characters"));
        }
        if self.game.trim().is_empty() {
            return Err("Game is required".to_string());
        }
        if self.location.trim().is_empty() {
            return Err("Location is required".to_string());
        }
        if self.max_participants == 0 {
            return Err("Maximum participants must be at least 1".to_string());
        }
        if self.max_participants > MAX_PARTICIPANTS_LIMIT {
            return Err(format!(
                "Maximum participants must be at most {MAX_PARTICIPANTS_LIMIT}"
            ));
        }
        if self.end_at.is_some_and(|end_at| end_at < self.start_at) {
            return Err("End time must not be before start time".to_string());
        }
        Ok(())
    }
}

/// Row handed to the repository when creating a tournament
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentRecord {
    pub registration_code: String,
    pub status: TournamentStatus,
    pub created_by: UserId,
    pub config: TournamentConfig,
}

/// Stored tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub registration_code: String,
    pub status: TournamentStatus,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub config: TournamentConfig,
}

/// Membership of a user in a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub tournament_id: TournamentId,
    pub user_id: UserId,
    pub joined_at: DateTime<Utc>,
}

/// Result of the atomic capacity-checked membership insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmitOutcome {
    /// New membership written
    Admitted(Membership),
    /// Pair already present, nothing written
    AlreadyMember,
    /// Capacity reached, nothing written
    Full,
    /// No tournament with that id
    TournamentMissing,
}

/// Tournament with its current participant count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentSummary {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub participant_count: u32,
}

impl TournamentSummary {
    /// Remaining free places
    pub fn open_slots(&self) -> u32 {
        self.tournament
            .config
            .max_participants
            .saturating_sub(self.participant_count)
    }
}

/// Tournament the user joined, with the join time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinedTournament {
    #[serde(flatten)]
    pub summary: TournamentSummary,
    pub joined_at: DateTime<Utc>,
}

/// Roster entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: UserId,
    pub joined_at: DateTime<Utc>,
    pub profile: Option<UserProfile>,
}

/// Tournament detail view with roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentView {
    pub tournament: Tournament,
    pub participant_count: u32,
    pub participants: Vec<Participant>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn config() -> TournamentConfig {
        TournamentConfig {
            title: "Spring Open".to_string(),
            description: None,
            game: "Golf".to_string(),
            location: "Pebble Creek".to_string(),
            start_at: Utc::now(),
            end_at: None,
            prize_pool: None,
            rules: None,
            max_participants: 16,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut c = config();
        c.title = "   ".to_string();
        assert_eq!(c.validate().unwrap_err(), "Title is required");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut c = config();
        c.max_participants = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_capacity_limit() {
        let mut c = config();
        c.max_participants = MAX_PARTICIPANTS_LIMIT;
        assert!(c.validate().is_ok());
        c.max_participants = MAX_PARTICIPANTS_LIMIT + 1;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut c = config();
        c.end_at = Some(c.start_at - Duration::hours(1));
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_status_round_trip_and_eligibility() {
        for status in [
            TournamentStatus::Upcoming,
            TournamentStatus::Ongoing,
            TournamentStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<TournamentStatus>(), Ok(status));
        }
        assert!(TournamentStatus::Upcoming.accepts_joins());
        assert!(!TournamentStatus::Ongoing.accepts_joins());
        assert!(!TournamentStatus::Completed.accepts_joins());
        assert!("cancelled".parse::<TournamentStatus>().is_err());
    }

    #[test]
    fn test_open_slots_saturates() {
        let summary = TournamentSummary {
            tournament: Tournament {
                id: 1,
                registration_code: "GOLF-1234AB".to_string(),
                status: TournamentStatus::Upcoming,
                created_by: UserId::new_v4(),
                created_at: Utc::now(),
                config: TournamentConfig {
                    max_participants: 2,
                    ..config()
                },
            },
            participant_count: 3,
        };
        assert_eq!(summary.open_slots(), 0);
    }

    #[test]
    fn test_tournament_serializes_flat() {
        let t = Tournament {
            id: 7,
            registration_code: "GOLF-1234AB".to_string(),
            status: TournamentStatus::Upcoming,
            created_by: UserId::new_v4(),
            created_at: Utc::now(),
            config: config(),
        };
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["title"], "Spring Open");
        assert_eq!(json["status"], "upcoming");
        assert_eq!(json["max_participants"], 16);
    }
}
