//! Chat store.
//!
//! Rooms and messages are persisted as one snapshot, written in full on
//! every mutation. Typing indicators live only in memory and are expired by
//! a [`TypingSweeper`] task. One-shot commands never see an indicator
//! expire unless they keep a sweeper running while they wait, so the
//! sweeper is meant for long-lived front ends and `crewdeck chat type`.

use chrono::{DateTime, Utc};
use crewdeck_core::chat::{
    ChatMessage, ChatRepository, ChatRoom, ChatSnapshot, MessageType, TypingIndicator,
    TypingRegistry,
};
use crewdeck_core::clock::Clock;
use crewdeck_core::config::ChatSettings;
use crewdeck_core::error::{AuthErrorKind, CrewError, Result};
use crewdeck_core::user::{CurrentUser, User};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::seed;

pub struct ChatStore {
    repository: Arc<dyn ChatRepository>,
    session: Arc<dyn CurrentUser>,
    clock: Arc<dyn Clock>,
    snapshot: watch::Sender<Arc<ChatSnapshot>>,
    typing: Arc<watch::Sender<TypingRegistry>>,
    active_room: watch::Sender<Option<String>>,
    typing_ttl: chrono::Duration,
    sweep_interval: Duration,
    write_lock: Mutex<()>,
}

impl ChatStore {
    /// Loads the stored snapshot, or demo rooms when nothing is stored and
    /// `seed_when_empty` is set.
    pub async fn load(
        repository: Arc<dyn ChatRepository>,
        session: Arc<dyn CurrentUser>,
        clock: Arc<dyn Clock>,
        settings: &ChatSettings,
        seed_when_empty: bool,
    ) -> Result<Self> {
        let stored = match repository.load().await {
            Ok(stored) => stored,
            Err(e) if e.is_serialization() => {
                tracing::warn!("[ChatStore] Ignoring unreadable chat file: {}", e);
                None
            }
            Err(e) => return Err(e),
        };
        let snapshot = match stored {
            Some(snapshot) => snapshot,
            None if seed_when_empty => seed::demo_chat(clock.now()),
            None => ChatSnapshot::default(),
        };
        tracing::info!("[ChatStore] Loaded {} rooms", snapshot.rooms.len());

        let typing_ttl = i64::try_from(settings.typing_ttl_ms)
            .map(chrono::Duration::milliseconds)
            .map_err(|_| CrewError::config("chat.typing_ttl_ms is out of range"))?;
        if settings.sweep_interval_ms == 0 {
            return Err(CrewError::config("chat.sweep_interval_ms must be positive"));
        }

        let (snapshot, _) = watch::channel(Arc::new(snapshot));
        let (typing, _) = watch::channel(TypingRegistry::new());
        let (active_room, _) = watch::channel(None);
        Ok(Self {
            repository,
            session,
            clock,
            snapshot,
            typing: Arc::new(typing),
            active_room,
            typing_ttl,
            sweep_interval: Duration::from_millis(settings.sweep_interval_ms),
            write_lock: Mutex::new(()),
        })
    }

    pub fn snapshot(&self) -> Arc<ChatSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn rooms(&self) -> Vec<ChatRoom> {
        self.snapshot.borrow().rooms.clone()
    }

    /// Messages of a room in arrival order; empty for unknown rooms.
    pub fn room_messages(&self, room_id: &str) -> Vec<ChatMessage> {
        self.snapshot.borrow().room_messages(room_id).to_vec()
    }

    /// Sum of unread counters across all rooms.
    pub fn unread_total(&self) -> u32 {
        self.snapshot.borrow().unread_total()
    }

    pub fn typing_users(&self, room_id: &str) -> Vec<TypingIndicator> {
        self.typing.borrow().users(room_id)
    }

    pub fn active_room(&self) -> Option<String> {
        self.active_room.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ChatSnapshot>> {
        self.snapshot.subscribe()
    }

    pub fn subscribe_typing(&self) -> watch::Receiver<TypingRegistry> {
        self.typing.subscribe()
    }

    /// Sends a message as the signed-in user.
    ///
    /// Without a session nothing changes and an auth error is returned.
    pub async fn send_message(
        &self,
        room_id: &str,
        content: &str,
        message_type: MessageType,
    ) -> Result<ChatMessage> {
        let user = self.require_user()?;
        if message_type == MessageType::System {
            return Err(CrewError::validation("system messages cannot be sent by users"));
        }
        if content.trim().is_empty() {
            return Err(CrewError::validation("message content must not be empty"));
        }

        let event_id = self
            .snapshot
            .borrow()
            .room(room_id)
            .and_then(|r| r.event_id.clone());
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            sender_id: user.id,
            sender_name: user.name,
            sender_avatar: user.avatar,
            content: content.to_string(),
            message_type,
            timestamp: self.clock.now(),
            event_id,
            is_read: false,
            reply_to: None,
            attachments: Vec::new(),
        };
        self.mutate(|snapshot| snapshot.append_message(room_id, message.clone()))
            .await?;

        tracing::debug!(
            "[ChatStore] {} sent message {} to {}",
            message.sender_id,
            message.id,
            room_id
        );
        Ok(message)
    }

    /// Marks every message in the room read and zeroes its unread counter.
    pub async fn mark_read(&self, room_id: &str) -> Result<()> {
        self.mutate(|snapshot| snapshot.mark_read(room_id)).await?;
        tracing::debug!("[ChatStore] Marked {} read", room_id);
        Ok(())
    }

    /// Switches the active room. Entering a room marks it read.
    pub async fn set_active_room(&self, room_id: Option<&str>) -> Result<()> {
        if let Some(room_id) = room_id {
            if self.snapshot.borrow().room(room_id).is_none() {
                return Err(CrewError::not_found("chat room", room_id));
            }
            self.mark_read(room_id).await?;
        }
        self.active_room.send_replace(room_id.map(str::to_string));
        Ok(())
    }

    /// Adds or refreshes the signed-in user's typing indicator.
    pub fn start_typing(&self, room_id: &str) -> Result<()> {
        let user = self.require_user()?;
        self.require_room(room_id)?;
        let now = self.clock.now();
        self.typing.send_modify(|registry| {
            registry.start(room_id, &user.id, &user.name, now);
        });
        Ok(())
    }

    /// Removes the signed-in user's typing indicator. Returns whether one existed.
    pub fn stop_typing(&self, room_id: &str) -> Result<bool> {
        let user = self.require_user()?;
        self.require_room(room_id)?;
        Ok(self
            .typing
            .send_if_modified(|registry| registry.stop(room_id, &user.id)))
    }

    /// Resolves once `room_id` has no typing indicators left.
    pub async fn typing_cleared(&self, room_id: &str) {
        let mut rx = self.typing.subscribe();
        loop {
            let active = !rx.borrow_and_update().users(room_id).is_empty();
            if !active || rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Removes expired typing indicators once. Returns how many were dropped.
    pub fn sweep_typing(&self, now: DateTime<Utc>) -> usize {
        sweep(&self.typing, now, self.typing_ttl)
    }

    /// Spawns the periodic typing expiry task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_sweeper(&self) -> TypingSweeper {
        TypingSweeper::spawn(
            self.typing.clone(),
            self.clock.clone(),
            self.typing_ttl,
            self.sweep_interval,
        )
    }

    fn require_user(&self) -> Result<User> {
        self.session
            .current_user()
            .ok_or_else(|| CrewError::auth(AuthErrorKind::Unauthenticated))
    }

    fn require_room(&self, room_id: &str) -> Result<()> {
        match self.snapshot.borrow().room(room_id) {
            Some(_) => Ok(()),
            None => Err(CrewError::not_found("chat room", room_id)),
        }
    }

    async fn mutate<T>(&self, apply: impl FnOnce(&mut ChatSnapshot) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock().await;
        let mut next = ChatSnapshot::clone(&self.snapshot.borrow());
        let output = apply(&mut next)?;
        if let Err(e) = self.repository.save(&next).await {
            tracing::error!("[ChatStore] Failed to persist chat: {}", e);
            return Err(e);
        }
        self.snapshot.send_replace(Arc::new(next));
        Ok(output)
    }
}

fn sweep(
    typing: &watch::Sender<TypingRegistry>,
    now: DateTime<Utc>,
    ttl: chrono::Duration,
) -> usize {
    let mut removed = 0;
    typing.send_if_modified(|registry| {
        removed = registry.sweep(now, ttl);
        removed > 0
    });
    removed
}

/// Handle to the periodic typing expiry task.
///
/// The task stops when [`TypingSweeper::shutdown`] is called or the handle
/// is dropped.
pub struct TypingSweeper {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl TypingSweeper {
    fn spawn(
        typing: Arc<watch::Sender<TypingRegistry>>,
        clock: Arc<dyn Clock>,
        ttl: chrono::Duration,
        period: Duration,
    ) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; consume it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = sweep(&typing, clock.now(), ttl);
                        if removed > 0 {
                            tracing::trace!("[TypingSweeper] Expired {} indicators", removed);
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
            tracing::debug!("[TypingSweeper] Stopped");
        });

        Self {
            shutdown_tx,
            task: Some(task),
        }
    }

    /// Stops the task and waits for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("[TypingSweeper] Task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for TypingSweeper {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use crewdeck_core::clock::ManualClock;
    use crewdeck_core::user::UserRole;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MemoryChat {
        stored: StdMutex<Option<ChatSnapshot>>,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl ChatRepository for MemoryChat {
        async fn load(&self) -> Result<Option<ChatSnapshot>> {
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn save(&self, snapshot: &ChatSnapshot) -> Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            *self.stored.lock().unwrap() = Some(snapshot.clone());
            Ok(())
        }
    }

    /// Session double with a settable identity.
    #[derive(Default)]
    struct FixedSession(StdMutex<Option<User>>);

    impl FixedSession {
        fn signed_in(user: User) -> Self {
            Self(StdMutex::new(Some(user)))
        }
    }

    impl CurrentUser for FixedSession {
        fn current_user(&self) -> Option<User> {
            self.0.lock().unwrap().clone()
        }
    }

    /// Wall clock that follows tokio's (pausable) clock.
    struct TokioClock {
        base: DateTime<Utc>,
        origin: tokio::time::Instant,
    }

    impl TokioClock {
        fn new(base: DateTime<Utc>) -> Self {
            Self {
                base,
                origin: tokio::time::Instant::now(),
            }
        }
    }

    impl Clock for TokioClock {
        fn now(&self) -> DateTime<Utc> {
            let elapsed = tokio::time::Instant::now() - self.origin;
            self.base + chrono::Duration::from_std(elapsed).unwrap()
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 14, 11, 0, 0).unwrap()
    }

    fn alex() -> User {
        seed::demo_user(UserRole::Photographer, start())
    }

    async fn store_with(
        session: Arc<dyn CurrentUser>,
        clock: Arc<dyn Clock>,
    ) -> (ChatStore, Arc<MemoryChat>) {
        let repository = Arc::new(MemoryChat::default());
        let store = ChatStore::load(
            repository.clone(),
            session,
            clock,
            &ChatSettings::default(),
            true,
        )
        .await
        .unwrap();
        (store, repository)
    }

    async fn signed_in_store() -> (ChatStore, Arc<MemoryChat>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        let (store, repository) =
            store_with(Arc::new(FixedSession::signed_in(alex())), clock.clone()).await;
        (store, repository, clock)
    }

    #[tokio::test]
    async fn test_send_message_updates_room() {
        let (store, repository, clock) = signed_in_store().await;
        clock.advance(chrono::Duration::seconds(10));

        let sent = store
            .send_message("event-1", "Cake cutting in 5", MessageType::Text)
            .await
            .unwrap();
        assert_eq!(sent.sender_id, "1");
        assert_eq!(sent.sender_name, "Alex Chen");
        assert_eq!(sent.event_id.as_deref(), Some("1"));
        assert!(!sent.is_read);

        let snapshot = store.snapshot();
        let room = snapshot.room("event-1").unwrap();
        assert_eq!(room.last_message.as_ref().unwrap().id, sent.id);
        assert_eq!(room.updated_at, clock.now());
        assert_eq!(store.room_messages("event-1").last().unwrap().content, "Cake cutting in 5");
        assert_eq!(repository.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_send_without_session_changes_nothing() {
        let clock = Arc::new(ManualClock::new(start()));
        let (store, repository) = store_with(Arc::new(FixedSession::default()), clock).await;
        let before = store.snapshot();

        let err = store
            .send_message("general", "hello", MessageType::Text)
            .await
            .unwrap_err();
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::Unauthenticated));
        assert_eq!(*store.snapshot(), *before);
        assert_eq!(repository.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_send_rejects_unknown_room_blank_and_system() {
        let (store, _, _) = signed_in_store().await;
        assert!(store.send_message("nope", "hi", MessageType::Text).await.unwrap_err().is_not_found());
        assert!(store.send_message("general", " ", MessageType::Text).await.unwrap_err().is_validation());
        assert!(store.send_message("general", "hi", MessageType::System).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_set_active_room_marks_read() {
        let (store, repository, _) = signed_in_store().await;
        assert_eq!(store.unread_total(), 2);

        store.set_active_room(Some("event-1")).await.unwrap();
        assert_eq!(store.active_room().as_deref(), Some("event-1"));
        assert_eq!(store.unread_total(), 0);
        assert!(store.room_messages("event-1").iter().all(|m| m.is_read));

        let persisted = repository.stored.lock().unwrap().clone().unwrap();
        assert_eq!(persisted.unread_total(), 0);

        store.set_active_room(None).await.unwrap();
        assert!(store.active_room().is_none());
        assert!(store.set_active_room(Some("nope")).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_typing_requires_session() {
        let clock = Arc::new(ManualClock::new(start()));
        let (store, _) = store_with(Arc::new(FixedSession::default()), clock).await;
        assert!(store.start_typing("general").unwrap_err().is_auth());
        assert!(store.stop_typing("general").unwrap_err().is_auth());
    }

    #[tokio::test]
    async fn test_typing_refresh_and_stop() {
        let (store, _, clock) = signed_in_store().await;
        store.start_typing("general").unwrap();
        clock.advance(chrono::Duration::seconds(2));
        store.start_typing("general").unwrap();

        let typing = store.typing_users("general");
        assert_eq!(typing.len(), 1);
        assert_eq!(typing[0].timestamp, clock.now());

        clock.advance(chrono::Duration::seconds(2));
        assert_eq!(store.sweep_typing(clock.now()), 0);
        assert!(store.stop_typing("general").unwrap());
        assert!(!store.stop_typing("general").unwrap());
        assert!(store.typing_users("general").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_expires_indicators() {
        let clock = Arc::new(TokioClock::new(start()));
        let (store, _) = store_with(Arc::new(FixedSession::signed_in(alex())), clock).await;
        let sweeper = store.start_sweeper();

        store.start_typing("general").unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.typing_users("general").len(), 1);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(store.typing_users("general").is_empty());

        sweeper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_cleared_waits_for_expiry() {
        let clock = Arc::new(TokioClock::new(start()));
        let (store, _) = store_with(Arc::new(FixedSession::signed_in(alex())), clock).await;
        store.start_typing("general").unwrap();
        let sweeper = store.start_sweeper();

        let started = tokio::time::Instant::now();
        tokio::time::timeout(Duration::from_secs(10), store.typing_cleared("general"))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert!(store.typing_users("general").is_empty());

        sweeper.shutdown().await;
        tokio::time::timeout(Duration::from_secs(1), store.typing_cleared("general"))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stops_on_shutdown() {
        let clock = Arc::new(TokioClock::new(start()));
        let (store, _) = store_with(Arc::new(FixedSession::signed_in(alex())), clock).await;
        let sweeper = store.start_sweeper();
        sweeper.shutdown().await;

        store.start_typing("general").unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.typing_users("general").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_sweeper_stops_task() {
        let clock = Arc::new(TokioClock::new(start()));
        let (store, _) = store_with(Arc::new(FixedSession::signed_in(alex())), clock).await;
        let sweeper = store.start_sweeper();
        drop(sweeper);
        tokio::time::sleep(Duration::from_millis(1)).await;

        store.start_typing("general").unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.typing_users("general").len(), 1);
    }
}
