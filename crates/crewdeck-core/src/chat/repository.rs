use async_trait::async_trait;

use super::model::ChatSnapshot;
use crate::error::Result;

/// Persistence for the chat snapshot.
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Loads the stored snapshot. `None` means nothing has been stored yet.
    async fn load(&self) -> Result<Option<ChatSnapshot>>;

    async fn save(&self, snapshot: &ChatSnapshot) -> Result<()>;
}
