//! # Tournamate
//!
//! Tournament sign-up backend: creators publish tournaments with a shareable
//! registration code and players join them, either directly or through the
//! code, until the tournament is full.
//!
//! ## Join protocol
//!
//! A join succeeds at most once per user and tournament, and never pushes a
//! tournament past `max_participants`. The duplicate check, the capacity check
//! and the insert happen as one atomic step inside the repository, so
//! concurrent joins for the last place admit exactly one player.
//!
//! Joining through a code additionally requires the tournament to still be
//! `upcoming`.
//!
//! ## Core Modules
//!
//! - [`tournament`]: Registration codes, creation, listings and joins
//! - [`db`]: Repository traits with PostgreSQL and in-memory implementations
//! - [`chat`]: Per-tournament chat for participants
//! - [`profile`]: User profiles
//! - [`contact`]: Contact form submissions
//! - [`auth`]: Verification of the identity provider's access tokens
//! - [`events`]: Domain events for the automation webhook
//!
//! ## Example
//!
//! ```
//! use tournamate::tournament::{derive_prefix, normalize_code};
//!
//! assert_eq!(derive_prefix("Golf"), "GOLF");
//! assert_eq!(normalize_code(" golf-4821qk "), "GOLF-4821QK");
//! ```

/// Access token verification.
pub mod auth;

/// Tournament chat.
pub mod chat;

/// Contact form.
pub mod contact;

/// Persistence layer.
pub mod db;

/// Domain events.
pub mod events;

/// User profiles.
pub mod profile;

/// Tournaments, registration codes and joins.
pub mod tournament;

pub use auth::{Claims, TokenVerifier};
pub use db::{Database, DatabaseConfig, Repositories};
pub use tournament::{
    CodeAllocator, RetryPolicy, Tournament, TournamentError, TournamentManager, TournamentStatus,
};
