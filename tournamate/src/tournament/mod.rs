//! Tournament module: registration codes, creation, listings and joins.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tournamate::db::Repositories;
//! use tournamate::events::LogPublisher;
//! use tournamate::tournament::{CodeAllocator, TournamentConfig, TournamentManager, UserId};
//!
//! # async fn run(config: TournamentConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let repos = Repositories::in_memory();
//! let manager = TournamentManager::new(&repos, Arc::new(LogPublisher), CodeAllocator::default());
//!
//! let creator = UserId::new_v4();
//! let tournament = manager.create_tournament(creator, config).await?;
//! println!("Share code {}", tournament.registration_code);
//!
//! manager
//!     .join_by_code(UserId::new_v4(), &tournament.registration_code)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod code;
pub mod errors;
pub mod manager;
pub mod models;

pub use code::{
    CodeAllocator, RetryPolicy, derive_prefix, fallback_code, generate_candidate,
    is_well_formed_code, normalize_code,
};
pub use errors::{TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{
    AdmitOutcome, JoinedTournament, Membership, Participant, Tournament, TournamentConfig,
    TournamentId, TournamentRecord, TournamentStatus, TournamentSummary, TournamentView, UserId,
};
