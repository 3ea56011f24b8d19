//! Storage layer for atomic file operations.

mod atomic_json;
mod secret_storage;

pub use atomic_json::{AtomicJsonError, AtomicJsonFile};
pub use secret_storage::{CRM_TOKEN_ENV, SecretStorage, SecretStorageError};

use crewdeck_core::error::{CrewError, Result};

/// Runs blocking file work off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CrewError::internal(format!("Failed to join task: {}", e)))?
}
