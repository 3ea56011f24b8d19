//! User domain module.
//!
//! # Module Structure
//!
//! - `model`: identity, signup/login payloads and the stored account record
//! - `repository`: persistence trait for the account directory
//! - `service`: identity service and current-user traits

mod model;
mod repository;
mod service;

pub use model::{
    LoginCredentials, Preferences, ServiceType, SignupData, User, UserRecord, UserRole,
    UserUpdate, split_display_name,
};
pub use repository::UserRepository;
pub use service::{CrmSyncOutcome, CurrentUser, IdentityService};
