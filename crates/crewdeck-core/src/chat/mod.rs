//! Chat domain module.
//!
//! # Module Structure
//!
//! - `model`: rooms, messages and the persisted chat snapshot
//! - `repository`: snapshot persistence trait
//! - `typing`: ephemeral typing indicators with time-based expiry

mod model;
mod repository;
mod typing;

pub use model::{Attachment, ChatMessage, ChatRoom, ChatSnapshot, MessageType};
pub use repository::ChatRepository;
pub use typing::{TypingIndicator, TypingRegistry};
