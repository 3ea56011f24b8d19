//! Session persistence.
//!
//! The session record is the signed-in [`crate::user::User`] or nothing.

mod repository;

pub use repository::SessionRepository;
