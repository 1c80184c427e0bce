//! Contact form submissions from visitors of the site.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{ContactError, ContactResult};
pub use manager::ContactManager;
pub use models::{
    ContactMessage, ContactMessageId, ContactSubmission, MAX_CONTACT_MESSAGE_LEN,
    MAX_CONTACT_NAME_LEN,
};
