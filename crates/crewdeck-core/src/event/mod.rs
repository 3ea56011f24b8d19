//! Event domain module.
//!
//! # Module Structure
//!
//! - `model`: events and their owned shot list, timeline and notes
//! - `repository`: whole-collection persistence trait
//! - `timeline`: pure derived views over an event and the wall clock

mod model;
mod repository;
pub mod timeline;

pub use model::{
    Event, EventDraft, EventKind, EventStatus, MediaType, Note, ShotItem, ShotPriority,
    ShotSummary, TeamMember, TeamRole, TimelineCategory, TimelineItem,
};
pub use repository::EventRepository;
