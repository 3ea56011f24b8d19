//! JSON file implementation of [`SessionRepository`].

use crate::storage::{AtomicJsonFile, run_blocking};
use async_trait::async_trait;
use crewdeck_core::error::Result;
use crewdeck_core::session::SessionRepository;
use crewdeck_core::user::User;
use std::path::PathBuf;
use std::sync::Arc;

/// Stores the signed-in identity in `session.json`.
pub struct JsonSessionRepository {
    file: Arc<AtomicJsonFile<User>>,
}

impl JsonSessionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path)),
        }
    }
}

#[async_trait]
impl SessionRepository for JsonSessionRepository {
    async fn load(&self) -> Result<Option<User>> {
        let file = self.file.clone();
        run_blocking(move || Ok(file.load()?)).await
    }

    async fn save(&self, user: &User) -> Result<()> {
        let file = self.file.clone();
        let user = user.clone();
        run_blocking(move || Ok(file.save(&user)?)).await?;
        tracing::debug!("[SessionRepository] Saved session to {}", self.file.path().display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let file = self.file.clone();
        run_blocking(move || Ok(file.remove()?)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crewdeck_core::user::{Preferences, ServiceType, UserRole};
    use tempfile::TempDir;

    fn create_test_user() -> User {
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap();
        User {
            id: "1".to_string(),
            email: "alex@example.com".to_string(),
            name: "Alex Chen".to_string(),
            avatar: None,
            role: UserRole::Photographer,
            service_type: ServiceType::Photography,
            company: Some("Lumen".to_string()),
            phone: None,
            bio: None,
            location: None,
            is_online: true,
            last_seen: at,
            preferences: Preferences::default(),
            crm_contact_id: None,
            crm_deal_ids: vec![],
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonSessionRepository::new(temp_dir.path().join("session.json"));

        assert!(repository.load().await.unwrap().is_none());

        let user = create_test_user();
        repository.save(&user).await.unwrap();
        let loaded = repository.load().await.unwrap().unwrap();
        assert_eq!(loaded, user);
        assert_eq!(loaded.last_seen, user.last_seen);

        repository.clear().await.unwrap();
        assert!(repository.load().await.unwrap().is_none());
        // Clearing twice is fine.
        repository.clear().await.unwrap();
    }
}
