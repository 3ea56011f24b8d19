use async_trait::async_trait;

use crate::error::Result;
use crate::user::User;

/// Repository for the persisted session identity.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Loads the persisted identity, if any.
    async fn load(&self) -> Result<Option<User>>;

    async fn save(&self, user: &User) -> Result<()>;

    /// Removes the persisted identity. Clearing an empty session is not an error.
    async fn clear(&self) -> Result<()>;
}
