//! User profiles, owned and edited by the signed-in user.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{ProfileError, ProfileResult};
pub use manager::ProfileManager;
pub use models::{HANDICAP_RANGE, MAX_NAME_LEN, ProfileUpdate, UserProfile};
