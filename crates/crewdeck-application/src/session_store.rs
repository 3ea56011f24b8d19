//! Session store.
//!
//! Holds the signed-in identity, persists it through a [`SessionRepository`]
//! and publishes it to subscribers.
//!
//! Login and signup may overlap (a user double-submitting a form). Every
//! identity-changing call takes a new generation number; a remote result
//! that comes back after a newer call was issued is dropped and reported as
//! [`CrewError::Superseded`].

use crewdeck_core::error::{CrewError, Result};
use crewdeck_core::session::SessionRepository;
use crewdeck_core::user::{CurrentUser, IdentityService, LoginCredentials, SignupData, User};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};

pub struct SessionStore {
    identity: Arc<dyn IdentityService>,
    repository: Arc<dyn SessionRepository>,
    state: watch::Sender<Option<User>>,
    generation: AtomicU64,
    write_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(identity: Arc<dyn IdentityService>, repository: Arc<dyn SessionRepository>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            identity,
            repository,
            state,
            generation: AtomicU64::new(0),
            write_lock: Mutex::new(()),
        }
    }

    /// Loads the persisted identity, if any, and publishes it.
    ///
    /// A corrupt session file is treated as signed out.
    pub async fn restore(&self) -> Result<Option<User>> {
        let _guard = self.write_lock.lock().await;
        let user = match self.repository.load().await {
            Ok(user) => user,
            Err(e) if e.is_serialization() => {
                tracing::warn!("[SessionStore] Ignoring unreadable session: {}", e);
                None
            }
            Err(e) => return Err(e),
        };
        if let Some(user) = &user {
            tracing::info!("[SessionStore] Restored session for {}", user.email);
        }
        self.state.send_replace(user.clone());
        Ok(user)
    }

    pub async fn login(&self, credentials: LoginCredentials) -> Result<User> {
        let generation = self.next_generation();
        let user = self.identity.login(credentials).await?;
        self.commit(generation, "login", user).await
    }

    /// Creates an account and signs in as it.
    ///
    /// If a newer identity change is issued while the account is being
    /// created, the account stays stored but the session is not switched and
    /// [`CrewError::Superseded`] is returned. Retrying the signup then fails
    /// with `EmailAlreadyExists`; log in with the same credentials instead.
    pub async fn signup(&self, data: SignupData) -> Result<User> {
        let generation = self.next_generation();
        let user = self.identity.signup(data).await?;
        self.commit(generation, "signup", user).await
    }

    /// Signs in as `user` without contacting the identity service.
    pub async fn quick_login(&self, user: User) -> Result<User> {
        let generation = self.next_generation();
        self.commit(generation, "quick login", user).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.next_generation();
        let _guard = self.write_lock.lock().await;
        self.repository.clear().await?;
        self.state.send_replace(None);
        tracing::info!("[SessionStore] Logged out");
        Ok(())
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Receives the identity after every change.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.state.subscribe()
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn commit(&self, generation: u64, request: &'static str, user: User) -> Result<User> {
        let _guard = self.write_lock.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("[SessionStore] Dropping stale {} result", request);
            return Err(CrewError::Superseded(request));
        }
        self.repository.save(&user).await?;
        self.state.send_replace(Some(user.clone()));
        tracing::info!("[SessionStore] Signed in as {}", user.email);
        Ok(user)
    }
}

impl CurrentUser for SessionStore {
    fn current_user(&self) -> Option<User> {
        self.user()
    }
}
