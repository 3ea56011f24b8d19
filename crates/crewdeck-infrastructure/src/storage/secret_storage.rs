//! Secret configuration file storage.
//!
//! Loads `secret.json` and resolves the CRM access token, falling back to the
//! `HUBSPOT_ACCESS_TOKEN` environment variable.

use crate::paths::CrewdeckPaths;
use crewdeck_core::config::SecretConfig;
use crewdeck_core::error::CrewError;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable consulted when `secret.json` has no token.
pub const CRM_TOKEN_ENV: &str = "HUBSPOT_ACCESS_TOKEN";

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Secret file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Secret file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            SecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

impl From<SecretStorageError> for CrewError {
    fn from(err: SecretStorageError) -> Self {
        CrewError::config(err.to_string())
    }
}

/// Read-only access to `secret.json`.
///
/// The file holds the CRM token in plaintext and should be mode 600.
/// Token values are never logged.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    pub fn new(paths: &CrewdeckPaths) -> Self {
        Self {
            path: paths.secret_file(),
        }
    }

    /// Uses a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The CRM token from `secret.json`, else from the environment.
    ///
    /// A missing secret file is not an error; a malformed one is.
    pub fn crm_token(&self) -> Result<Option<String>, SecretStorageError> {
        self.crm_token_with(|key| std::env::var(key).ok())
    }

    fn crm_token_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<String>, SecretStorageError> {
        let from_file = match self.load() {
            Ok(config) => config.hubspot_token().map(str::to_string),
            Err(SecretStorageError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        if from_file.is_some() {
            tracing::debug!("[SecretStorage] CRM token loaded from {}", self.path.display());
            return Ok(from_file);
        }

        let from_env = env(CRM_TOKEN_ENV).filter(|t| !t.trim().is_empty());
        if from_env.is_some() {
            tracing::debug!("[SecretStorage] CRM token loaded from ${}", CRM_TOKEN_ENV);
        }
        Ok(from_env)
    }
}
