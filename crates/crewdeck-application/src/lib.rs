//! Application layer for crewdeck.
//!
//! The stores here own in-memory state, serialize their own mutations,
//! persist through the core repository traits and publish every change
//! on a `tokio::sync::watch` channel.

pub mod account_service;
pub mod chat_store;
pub mod context;
pub mod event_store;
pub mod seed;
pub mod session_store;

pub use account_service::AccountService;
pub use chat_store::{ChatStore, TypingSweeper};
pub use context::CrewdeckApp;
pub use event_store::EventStore;
pub use session_store::SessionStore;
