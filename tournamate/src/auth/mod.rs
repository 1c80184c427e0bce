//! Authentication module verifying access tokens from the identity provider.
//!
//! Users sign in elsewhere; requests carry an HS256 JWT whose `sub` is the
//! user's id.
//!
//! ## Example
//!
//! ```
//! use chrono::Duration;
//! use tournamate::auth::TokenVerifier;
//! use tournamate::tournament::UserId;
//!
//! let verifier = TokenVerifier::new("a-development-secret-of-32-chars!", None).unwrap();
//! let user = UserId::new_v4();
//! let token = verifier.issue(user, None, Duration::minutes(15)).unwrap();
//! assert_eq!(verifier.verify(&token).unwrap().sub, user);
//! ```

pub mod errors;
pub mod models;
pub mod verifier;

pub use errors::{AuthError, AuthResult};
pub use models::Claims;
pub use verifier::{MIN_SECRET_LEN, TokenVerifier};
