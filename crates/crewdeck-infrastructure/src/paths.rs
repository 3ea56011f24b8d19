//! Unified path management for crewdeck files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/crewdeck/          # Base directory (or $CREWDECK_HOME)
//! ├── config.toml              # Application configuration
//! ├── secret.json              # CRM access token
//! └── data/                    # Store records (overridable in config.toml)
//!     ├── session.json
//!     ├── events.json
//!     ├── chat.json
//!     └── users.json
//! ```

use crewdeck_core::config::StorageSettings;
use crewdeck_core::error::CrewError;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the base directory.
pub const HOME_ENV: &str = "CREWDECK_HOME";

const APP_DIR: &str = "crewdeck";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Neither `$CREWDECK_HOME` nor a platform config directory is available.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot determine crewdeck config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for CrewError {
    fn from(err: PathError) -> Self {
        CrewError::config(err.to_string())
    }
}

/// Resolved file locations for one crewdeck installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewdeckPaths {
    base: PathBuf,
    data: PathBuf,
}

impl CrewdeckPaths {
    /// Resolves the base directory from `$CREWDECK_HOME` or the platform
    /// config dir (`~/.config/crewdeck` on Linux).
    pub fn resolve() -> Result<Self, PathError> {
        let base = match std::env::var_os(HOME_ENV) {
            Some(home) if !home.is_empty() => PathBuf::from(home),
            _ => dirs::config_dir()
                .ok_or(PathError::ConfigDirNotFound)?
                .join(APP_DIR),
        };
        Ok(Self::with_base(base))
    }

    /// Uses `base` directly. Data files go to `base/data`.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let data = base.join("data");
        Self { base, data }
    }

    /// Applies the storage section of `config.toml`.
    pub fn with_storage_settings(mut self, settings: &StorageSettings) -> Self {
        if let Some(dir) = &settings.data_dir {
            let dir = Path::new(dir);
            self.data = if dir.is_absolute() {
                dir.to_path_buf()
            } else {
                self.base.join(dir)
            };
        }
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn data_dir(&self) -> &Path {
        &self.data
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    pub fn secret_file(&self) -> PathBuf {
        self.base.join("secret.json")
    }

    pub fn session_file(&self) -> PathBuf {
        self.data.join("session.json")
    }

    pub fn events_file(&self) -> PathBuf {
        self.data.join("events.json")
    }

    pub fn chat_file(&self) -> PathBuf {
        self.data.join("chat.json")
    }

    pub fn users_file(&self) -> PathBuf {
        self.data.join("users.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_base() {
        let paths = CrewdeckPaths::with_base("/tmp/crew");
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/crew/config.toml"));
        assert_eq!(paths.secret_file(), PathBuf::from("/tmp/crew/secret.json"));
        assert_eq!(paths.events_file(), PathBuf::from("/tmp/crew/data/events.json"));
        assert_eq!(paths.users_file(), PathBuf::from("/tmp/crew/data/users.json"));
    }

    #[test]
    fn test_data_dir_override() {
        let relative = StorageSettings {
            data_dir: Some("store".to_string()),
            ..Default::default()
        };
        let paths = CrewdeckPaths::with_base("/tmp/crew").with_storage_settings(&relative);
        assert_eq!(paths.chat_file(), PathBuf::from("/tmp/crew/store/chat.json"));

        let absolute = StorageSettings {
            data_dir: Some("/var/lib/crewdeck".to_string()),
            ..Default::default()
        };
        let paths = CrewdeckPaths::with_base("/tmp/crew").with_storage_settings(&absolute);
        assert_eq!(paths.session_file(), PathBuf::from("/var/lib/crewdeck/session.json"));
    }
}
