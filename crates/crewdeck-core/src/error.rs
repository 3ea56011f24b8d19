//! Error types for crewdeck.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an authentication-related operation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    /// Email/password pair did not match any account.
    InvalidCredentials,
    /// An account with this email already exists.
    EmailAlreadyExists,
    /// The operation needs a signed-in user and there is none.
    Unauthenticated,
}

impl std::fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::InvalidCredentials => "invalid email or password",
            Self::EmailAlreadyExists => "user already exists with this email",
            Self::Unauthenticated => "user not authenticated",
        };
        f.write_str(text)
    }
}

/// A shared error type for the whole crewdeck workspace.
///
/// Store mutations never swallow a miss: an unknown event, shot or room id
/// surfaces as [`CrewError::NotFound`] so callers can tell "wrong id" apart
/// from "value was already set".
#[derive(Error, Debug, Clone, Serialize)]
pub enum CrewError {
    /// Authentication failure
    #[error("Authentication error: {0}")]
    Auth(AuthErrorKind),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Failure at the CRM boundary (network, non-2xx, malformed payload)
    #[error("Remote error: {message}")]
    Remote {
        message: String,
        detail: Option<String>,
    },

    /// Malformed input to a mutation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A newer request was issued before this one resolved
    #[error("Request superseded by a newer {0} request")]
    Superseded(&'static str),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CrewError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn auth(kind: AuthErrorKind) -> Self {
        Self::Auth(kind)
    }

    /// Creates a Remote error with an optional detail payload
    pub fn remote(message: impl Into<String>, detail: Option<String>) -> Self {
        Self::Remote {
            message: message.into(),
            detail,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an authentication error of any kind
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Returns the auth failure kind, if this is an auth error
    pub fn auth_kind(&self) -> Option<AuthErrorKind> {
        match self {
            Self::Auth(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CrewError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CrewError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CrewError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CrewError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CrewError>`.
pub type Result<T> = std::result::Result<T, CrewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = CrewError::not_found("event", "42");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Entity not found: event '42'");
    }

    #[test]
    fn test_auth_kind() {
        let err = CrewError::auth(AuthErrorKind::EmailAlreadyExists);
        assert!(err.is_auth());
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::EmailAlreadyExists));
        assert!(CrewError::validation("x").auth_kind().is_none());
    }

    #[test]
    fn test_from_json_error() {
        let err: CrewError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.is_serialization());
    }
}
