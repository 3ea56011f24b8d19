use async_trait::async_trait;

use super::model::Event;
use crate::error::Result;

/// Whole-collection persistence for events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Loads every stored event. `None` means nothing has been stored yet.
    async fn load_all(&self) -> Result<Option<Vec<Event>>>;

    /// Replaces the stored collection.
    async fn save_all(&self, events: &[Event]) -> Result<()>;
}
