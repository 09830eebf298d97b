//! Error types used throughout the connector

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the connector
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ConnectorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Remote API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Identity resolution error: {0}")]
    Identity(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConnectorError {
    /// Best-known HTTP status for this error, used when reporting a failure
    /// code back to the host.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Api { status, .. } => *status,
            Self::Conflict(_) => 409,
            Self::InvalidInput(_) | Self::Identity(_) => 400,
            Self::NotFound(_) => 404,
            Self::Auth(_) => 401,
            Self::Cancelled => 499,
            Self::Config(_) | Self::Network(_) | Self::Internal(_) => 500,
        }
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<ResolutionError> for ConnectorError {
    fn from(err: ResolutionError) -> Self {
        Self::Identity(err.to_string())
    }
}

/// Result type alias for connector operations
pub type Result<T> = std::result::Result<T, ConnectorError>;

/// Why an object could not be given a cache identity.
///
/// Never fails a whole batch; the assembler counts and logs it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("identity field `{field}` is empty")]
    EmptyKey { field: String },

    #[error("resolver rejected object: {0}")]
    Rejected(String),

    #[error("no resolver registered")]
    NoResolver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_variant() {
        let api = ConnectorError::Api { status: 429, message: "slow down".into() };
        assert_eq!(api.status_code(), 429);
        assert_eq!(ConnectorError::Conflict("docs".into()).status_code(), 409);
        assert_eq!(ConnectorError::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(ConnectorError::Identity("x".into()).status_code(), 400);
        assert_eq!(ConnectorError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ConnectorError::Auth("x".into()).status_code(), 401);
        assert_eq!(ConnectorError::Cancelled.status_code(), 499);
        assert_eq!(ConnectorError::Network("x".into()).status_code(), 500);
        assert_eq!(ConnectorError::Config("x".into()).status_code(), 500);
    }

    #[test]
    fn serializes_with_type_tag() {
        let err = ConnectorError::Config("missing api key".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Config");
        assert_eq!(json["message"], "missing api key");

        let back: ConnectorError = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn resolution_error_converts_to_identity() {
        let err: ConnectorError =
            ResolutionError::EmptyKey { field: "Id".into() }.into();
        assert!(matches!(err, ConnectorError::Identity(ref m) if m.contains("`Id`")));
    }
}
