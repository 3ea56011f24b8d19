//! Event store.
//!
//! Every mutation copies the collection, applies the change, writes the
//! whole collection and only then swaps the published snapshot. A failed
//! write leaves the in-memory state as it was.

use chrono::{DateTime, Utc};
use crewdeck_core::clock::{Clock, SystemClock};
use crewdeck_core::error::{CrewError, Result};
use crewdeck_core::event::{Event, EventDraft, EventRepository, EventStatus, Note};
use crewdeck_core::id::time_based_id;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use crate::seed;

pub struct EventStore {
    repository: Arc<dyn EventRepository>,
    clock: Arc<dyn Clock>,
    events: watch::Sender<Arc<Vec<Event>>>,
    selected: watch::Sender<Option<String>>,
    write_lock: Mutex<()>,
}

impl EventStore {
    /// Loads stored events. With nothing stored, starts from demo data when
    /// `seed_when_empty` is set.
    pub async fn load(
        repository: Arc<dyn EventRepository>,
        clock: Arc<dyn Clock>,
        seed_when_empty: bool,
    ) -> Result<Self> {
        let stored = match repository.load_all().await {
            Ok(stored) => stored,
            Err(e) if e.is_serialization() => {
                tracing::warn!("[EventStore] Ignoring unreadable events file: {}", e);
                None
            }
            Err(e) => return Err(e),
        };
        let events = match stored {
            Some(events) => events,
            None if seed_when_empty => seed::demo_events(clock.now()),
            None => Vec::new(),
        };
        tracing::info!("[EventStore] Loaded {} events", events.len());

        let (events, _) = watch::channel(Arc::new(events));
        let (selected, _) = watch::channel(None);
        Ok(Self {
            repository,
            clock,
            events,
            selected,
            write_lock: Mutex::new(()),
        })
    }

    /// Loads with the system clock.
    pub async fn open(repository: Arc<dyn EventRepository>, seed_when_empty: bool) -> Result<Self> {
        Self::load(repository, Arc::new(SystemClock), seed_when_empty).await
    }

    pub fn events(&self) -> Arc<Vec<Event>> {
        self.events.borrow().clone()
    }

    pub fn event(&self, event_id: &str) -> Option<Event> {
        self.events.borrow().iter().find(|e| e.id == event_id).cloned()
    }

    /// Upcoming events, soonest first.
    pub fn upcoming_events(&self) -> Vec<Event> {
        let mut upcoming = self.with_status(EventStatus::Upcoming);
        upcoming.sort_by_key(|e| e.date);
        upcoming
    }

    pub fn active_events(&self) -> Vec<Event> {
        self.with_status(EventStatus::Active)
    }

    /// The first active event, if any.
    pub fn active_event(&self) -> Option<Event> {
        self.active_events().into_iter().next()
    }

    /// Selects an event by id, or clears the selection with `None`.
    ///
    /// Selecting an unknown id is allowed; [`Self::selected_event`] then
    /// yields nothing until such an event exists.
    pub fn select_event(&self, event_id: Option<&str>) {
        self.selected.send_replace(event_id.map(str::to_string));
    }

    pub fn selected_event(&self) -> Option<Event> {
        let selected = self.selected.borrow().clone()?;
        self.event(&selected)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Event>>> {
        self.events.subscribe()
    }

    /// Flips one shot's completion flag. Returns the new value.
    pub async fn toggle_shot_complete(&self, event_id: &str, shot_id: &str) -> Result<bool> {
        let completed = self
            .mutate(|events| find_mut(events, event_id)?.toggle_shot(shot_id))
            .await?;
        tracing::debug!(
            "[EventStore] Shot {}/{} completed={}",
            event_id,
            shot_id,
            completed
        );
        Ok(completed)
    }

    /// Appends a note stamped with the current time.
    pub async fn add_note(
        &self,
        event_id: &str,
        content: &str,
        author: &str,
        author_avatar: Option<String>,
    ) -> Result<Note> {
        if content.trim().is_empty() {
            return Err(CrewError::validation("note content must not be empty"));
        }
        let note = Note {
            id: Uuid::new_v4().to_string(),
            author: author.to_string(),
            author_avatar,
            content: content.to_string(),
            timestamp: self.clock.now(),
            attachments: Vec::new(),
        };
        self.mutate(|events| {
            find_mut(events, event_id)?.notes.push(note.clone());
            Ok(())
        })
        .await?;
        tracing::debug!("[EventStore] Added note {} to event {}", note.id, event_id);
        Ok(note)
    }

    /// Stores a new event and returns its time-based id.
    pub async fn add_event(&self, draft: EventDraft) -> Result<String> {
        draft.validate()?;
        let id = time_based_id(self.clock.now());
        let event = draft.into_event(id.clone());
        self.mutate(|events| {
            events.push(event);
            Ok(())
        })
        .await?;
        tracing::info!("[EventStore] Created event {}", id);
        Ok(id)
    }

    /// Replaces the event with the same id, or appends it.
    pub async fn update_event(&self, event: Event) -> Result<()> {
        let id = event.id.clone();
        self.mutate(|events| {
            match events.iter_mut().find(|e| e.id == event.id) {
                Some(existing) => *existing = event,
                None => events.push(event),
            }
            Ok(())
        })
        .await?;
        tracing::debug!("[EventStore] Updated event {}", id);
        Ok(())
    }

    /// Current time according to the store's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn with_status(&self, status: EventStatus) -> Vec<Event> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.status == status)
            .cloned()
            .collect()
    }

    async fn mutate<T>(&self, apply: impl FnOnce(&mut Vec<Event>) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock().await;
        let mut next = Vec::clone(&self.events.borrow());
        let output = apply(&mut next)?;
        if let Err(e) = self.repository.save_all(&next).await {
            tracing::error!("[EventStore] Failed to persist events: {}", e);
            return Err(e);
        }
        self.events.send_replace(Arc::new(next));
        Ok(output)
    }
}

fn find_mut<'a>(events: &'a mut [Event], event_id: &str) -> Result<&'a mut Event> {
    events
        .iter_mut()
        .find(|e| e.id == event_id)
        .ok_or_else(|| CrewError::not_found("event", event_id))
}
