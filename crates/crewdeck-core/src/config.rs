//! Configuration models.
//!
//! `config.toml` is deserialized into [`RootConfig`]; every section has serde
//! defaults so a missing or partial file still yields a usable configuration.
//! Secrets live separately in `secret.json` ([`SecretConfig`]).

use serde::{Deserialize, Serialize};

pub const DEFAULT_CRM_BASE_URL: &str = "https://api.hubapi.com";

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RootConfig {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub crm: CrmSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Overrides the data directory. Relative paths resolve against the
    /// crewdeck home directory.
    #[serde(default)]
    pub data_dir: Option<String>,
    /// Seed demo events and rooms when the store is empty.
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            seed_demo_data: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmSettings {
    #[serde(default = "default_crm_base_url")]
    pub base_url: String,
    /// Create a CRM contact on signup (best effort).
    #[serde(default = "default_true")]
    pub create_contact_on_signup: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_crm_base_url() -> String {
    DEFAULT_CRM_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for CrmSettings {
    fn default() -> Self {
        Self {
            base_url: default_crm_base_url(),
            create_contact_on_signup: true,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Age after which a typing indicator is dropped.
    #[serde(default = "default_typing_ttl_ms")]
    pub typing_ttl_ms: u64,
    /// Cadence of the typing expiry sweep.
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
}

fn default_typing_ttl_ms() -> u64 {
    3_000
}

fn default_sweep_interval_ms() -> u64 {
    1_000
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            typing_ttl_ms: default_typing_ttl_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
        }
    }
}

/// Root of `secret.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub hubspot: Option<HubSpotSecret>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSpotSecret {
    pub access_token: String,
}

impl SecretConfig {
    pub fn hubspot_token(&self) -> Option<&str> {
        self.hubspot
            .as_ref()
            .map(|h| h.access_token.as_str())
            .filter(|t| !t.trim().is_empty())
    }
}
