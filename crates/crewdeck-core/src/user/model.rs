//! User domain model.

use crate::error::{CrewError, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Photographer,
    Videographer,
    Client,
    Assistant,
    Director,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Photographer => "photographer",
            Self::Videographer => "videographer",
            Self::Client => "client",
            Self::Assistant => "assistant",
            Self::Director => "director",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = CrewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "photographer" => Ok(Self::Photographer),
            "videographer" => Ok(Self::Videographer),
            "client" => Ok(Self::Client),
            "assistant" => Ok(Self::Assistant),
            "director" => Ok(Self::Director),
            other => Err(CrewError::validation(format!("unknown role '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Photography,
    Videography,
    Hybrid,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Photography => "photography",
            Self::Videography => "videography",
            Self::Hybrid => "hybrid",
        };
        f.write_str(text)
    }
}

impl FromStr for ServiceType {
    type Err = CrewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "photography" => Ok(Self::Photography),
            "videography" => Ok(Self::Videography),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(CrewError::validation(format!(
                "unknown service type '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub notifications: bool,
    pub dark_mode: bool,
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            notifications: true,
            dark_mode: false,
            language: "en".to_string(),
        }
    }
}

/// An authenticated identity.
///
/// This is what the session holds and persists. It never carries the password
/// or its hash; those stay in [`UserRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: UserRole,
    pub service_type: ServiceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default = "Utc::now")]
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crm_contact_id: Option<String>,
    #[serde(default)]
    pub crm_deal_ids: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Credentials for [`crate::user::IdentityService::login`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Profile submitted on signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupData {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
    pub service_type: ServiceType,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Pre-existing CRM contact to link instead of creating one.
    #[serde(default)]
    pub crm_contact_id: Option<String>,
}

impl SignupData {
    /// Checks email shape, password length and a non-empty name.
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CrewError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.name.trim().is_empty() {
            return Err(CrewError::validation("name must not be empty"));
        }
        Ok(())
    }
}

pub(crate) fn validate_email(email: &str) -> Result<()> {
    if EMAIL_PATTERN.is_match(email) {
        Ok(())
    } else {
        Err(CrewError::validation(format!("invalid email address '{email}'")))
    }
}

/// Partial profile update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub service_type: Option<ServiceType>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub crm_contact_id: Option<String>,
}

impl UserUpdate {
    /// Validates and applies the update, bumping `updated_at`.
    pub fn apply(self, user: &mut User, now: DateTime<Utc>) -> Result<()> {
        if let Some(email) = self.email {
            validate_email(&email)?;
            user.email = email;
        }
        if let Some(name) = self.name {
            if name.trim().is_empty() {
                return Err(CrewError::validation("name must not be empty"));
            }
            user.name = name;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(service_type) = self.service_type {
            user.service_type = service_type;
        }
        if self.company.is_some() {
            user.company = self.company;
        }
        if self.phone.is_some() {
            user.phone = self.phone;
        }
        if self.crm_contact_id.is_some() {
            user.crm_contact_id = self.crm_contact_id;
        }
        user.updated_at = now;
        Ok(())
    }
}

/// Stored account: the public identity plus password material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(flatten)]
    pub user: User,
    pub password_salt: String,
    pub password_hash: String,
}

/// Splits a display name into CRM first/last name on the first space.
pub fn split_display_name(name: &str) -> (String, String) {
    let trimmed = name.trim();
    match trimmed.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}
