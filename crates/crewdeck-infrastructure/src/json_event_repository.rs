//! JSON file implementation of [`EventRepository`].

use crate::storage::{AtomicJsonFile, run_blocking};
use async_trait::async_trait;
use crewdeck_core::error::Result;
use crewdeck_core::event::{Event, EventRepository};
use std::path::PathBuf;
use std::sync::Arc;

/// Stores the whole event list in `events.json`.
pub struct JsonEventRepository {
    file: Arc<AtomicJsonFile<Vec<Event>>>,
}

impl JsonEventRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path)),
        }
    }
}

#[async_trait]
impl EventRepository for JsonEventRepository {
    async fn load_all(&self) -> Result<Option<Vec<Event>>> {
        let file = self.file.clone();
        run_blocking(move || Ok(file.load()?)).await
    }

    async fn save_all(&self, events: &[Event]) -> Result<()> {
        let file = self.file.clone();
        let events = events.to_vec();
        let count = events.len();
        run_blocking(move || Ok(file.save(&events)?)).await?;
        tracing::debug!("[EventRepository] Saved {} events", count);
        Ok(())
    }
}
