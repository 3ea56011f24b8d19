//! Domain layer for crewdeck.
//!
//! Models, repository and gateway traits, and the pure derived views that the
//! application stores build on. Nothing here performs I/O.

pub mod chat;
pub mod clock;
pub mod config;
pub mod crm;
pub mod error;
pub mod event;
pub mod id;
pub mod session;
pub mod time_of_day;
pub mod user;

// Re-export common error type
pub use error::CrewError;
pub use time_of_day::TimeOfDay;
