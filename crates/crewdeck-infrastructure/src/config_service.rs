//! Configuration service.
//!
//! Loads `config.toml` from the crewdeck base directory. A missing file yields
//! the defaults; a malformed one is a configuration error.

use crate::paths::CrewdeckPaths;
use crewdeck_core::config::RootConfig;
use crewdeck_core::error::{CrewError, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(paths: &CrewdeckPaths) -> Self {
        Self {
            path: paths.config_file(),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<RootConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[ConfigService] {} not found, using defaults",
                self.path.display()
            );
            return Ok(RootConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| {
            CrewError::config(format!("Invalid {}: {}", self.path.display(), e))
        })
    }

    /// Writes a config file with every default spelled out, unless one exists.
    pub fn ensure_config_file(&self) -> Result<PathBuf> {
        if self.path.exists() {
            return Ok(self.path.clone());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&RootConfig::default())?;
        fs::write(&self.path, content)?;
        tracing::info!("[ConfigService] Created {}", self.path.display());
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(service.load().unwrap(), RootConfig::default());
    }

    #[test]
    fn test_ensure_then_load_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CrewdeckPaths::with_base(temp_dir.path());
        let service = ConfigService::new(&paths);

        let path = service.ensure_config_file().unwrap();
        assert!(path.exists());
        assert_eq!(service.load().unwrap(), RootConfig::default());
    }

    #[test]
    fn test_existing_file_is_not_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "log_level = \"debug\"\n").unwrap();

        let service = ConfigService::with_path(path);
        service.ensure_config_file().unwrap();
        assert_eq!(service.load().unwrap().log_level, "debug");
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "log_level = [").unwrap();

        let err = ConfigService::with_path(path).load().unwrap_err();
        assert!(matches!(err, CrewError::Config(_)));
    }
}
