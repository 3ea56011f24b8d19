//! JSON file implementation of [`UserRepository`].

use crate::storage::{AtomicJsonFile, run_blocking};
use async_trait::async_trait;
use crewdeck_core::error::{AuthErrorKind, CrewError, Result};
use crewdeck_core::user::{UserRecord, UserRepository};
use std::path::PathBuf;
use std::sync::Arc;

/// Stores the account directory in `users.json`.
pub struct JsonUserRepository {
    file: Arc<AtomicJsonFile<Vec<UserRecord>>>,
}

impl JsonUserRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path)),
        }
    }

    async fn load_records(&self) -> Result<Vec<UserRecord>> {
        let file = self.file.clone();
        run_blocking(move || Ok(file.load()?.unwrap_or_default())).await
    }
}

/// Replaces the record with the same id or appends it, unless another
/// account already holds its email.
pub(crate) fn upsert_unique_email(records: &mut Vec<UserRecord>, record: UserRecord) -> Result<()> {
    if records
        .iter()
        .any(|r| r.user.email == record.user.email && r.user.id != record.user.id)
    {
        return Err(CrewError::auth(AuthErrorKind::EmailAlreadyExists));
    }
    match records.iter_mut().find(|r| r.user.id == record.user.id) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
    Ok(())
}

#[async_trait]
impl UserRepository for JsonUserRepository {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let records = self.load_records().await?;
        Ok(records.into_iter().find(|r| r.user.id == user_id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let records = self.load_records().await?;
        Ok(records.into_iter().find(|r| r.user.email == email))
    }

    async fn save(&self, record: UserRecord) -> Result<()> {
        let file = self.file.clone();
        let user_id = record.user.id.clone();
        run_blocking(move || {
            file.update(Vec::new(), |records: &mut Vec<UserRecord>| {
                upsert_unique_email(records, record)
            })?;
            Ok(())
        })
        .await?;
        tracing::debug!("[UserRepository] Saved user {}", user_id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>> {
        self.load_records().await
    }

    async fn clear(&self) -> Result<()> {
        let file = self.file.clone();
        run_blocking(move || Ok(file.save(&Vec::new())?)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crewdeck_core::user::{Preferences, ServiceType, User, UserRole};
    use tempfile::TempDir;

    fn create_test_record(id: &str, email: &str) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            user: User {
                id: id.to_string(),
                email: email.to_string(),
                name: "Maria Rodriguez".to_string(),
                avatar: None,
                role: UserRole::Videographer,
                service_type: ServiceType::Videography,
                company: None,
                phone: None,
                bio: None,
                location: None,
                is_online: false,
                last_seen: now,
                preferences: Preferences::default(),
                crm_contact_id: None,
                crm_deal_ids: vec![],
                created_at: now,
                updated_at: now,
            },
            password_salt: "salt".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonUserRepository::new(temp_dir.path().join("users.json"));

        repository
            .save(create_test_record("1", "maria@example.com"))
            .await
            .unwrap();

        let by_id = repository.find_by_id("1").await.unwrap().unwrap();
        assert_eq!(by_id.user.email, "maria@example.com");
        let by_email = repository
            .find_by_email("maria@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.user.id, "1");
        assert!(repository.find_by_email("MARIA@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_same_id() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonUserRepository::new(temp_dir.path().join("users.json"));

        repository.save(create_test_record("1", "a@example.com")).await.unwrap();
        repository.save(create_test_record("2", "b@example.com")).await.unwrap();
        let mut changed = create_test_record("1", "a@example.com");
        changed.user.name = "Renamed".to_string();
        repository.save(changed).await.unwrap();

        let all = repository.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].user.name, "Renamed");
    }

    #[tokio::test]
    async fn test_save_rejects_email_held_by_another_id() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonUserRepository::new(temp_dir.path().join("users.json"));
        repository.save(create_test_record("1", "a@example.com")).await.unwrap();

        let err = repository
            .save(create_test_record("2", "a@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::EmailAlreadyExists));

        // Moving an existing account onto a taken email fails the same way.
        repository.save(create_test_record("2", "b@example.com")).await.unwrap();
        let err = repository
            .save(create_test_record("2", "a@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::EmailAlreadyExists));

        let all = repository.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].user.email, "b@example.com");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_keep_email_unique() {
        let temp_dir = TempDir::new().unwrap();
        let repository = Arc::new(JsonUserRepository::new(temp_dir.path().join("users.json")));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let repository = repository.clone();
                tokio::spawn(async move {
                    repository
                        .save(create_test_record(&format!("user-{i}"), "dup@example.com"))
                        .await
                })
            })
            .collect();

        let mut saved = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(()) => saved += 1,
                Err(e) => assert_eq!(e.auth_kind(), Some(AuthErrorKind::EmailAlreadyExists)),
            }
        }
        assert_eq!(saved, 1);
        assert_eq!(repository.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonUserRepository::new(temp_dir.path().join("users.json"));
        repository.save(create_test_record("1", "a@example.com")).await.unwrap();

        repository.clear().await.unwrap();
        assert!(repository.list_all().await.unwrap().is_empty());
    }
}
