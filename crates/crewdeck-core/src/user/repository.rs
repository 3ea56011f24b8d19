//! Account directory repository trait.

use async_trait::async_trait;

use super::model::UserRecord;
use crate::error::Result;

/// Persistence for stored accounts.
///
/// Email lookups are exact (case-sensitive), matching how accounts are keyed.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRecord>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Inserts or replaces the record with the same id.
    ///
    /// Fails with `AuthErrorKind::EmailAlreadyExists` when a record with a
    /// different id already holds the email. The check and the write happen
    /// as one step.
    async fn save(&self, record: UserRecord) -> Result<()>;

    async fn list_all(&self) -> Result<Vec<UserRecord>>;

    async fn clear(&self) -> Result<()>;
}
