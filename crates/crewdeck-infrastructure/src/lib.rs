//! File-backed infrastructure for crewdeck.
//!
//! Repositories here implement the core traits on top of one JSON file each,
//! written atomically under a file lock.

pub mod config_service;
pub mod json_chat_repository;
pub mod json_event_repository;
pub mod json_session_repository;
pub mod json_user_repository;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::json_chat_repository::JsonChatRepository;
pub use crate::json_event_repository::JsonEventRepository;
pub use crate::json_session_repository::JsonSessionRepository;
pub use crate::json_user_repository::JsonUserRepository;
pub use crate::paths::CrewdeckPaths;
pub use crate::storage::SecretStorage;
