//! API-specific error types
//!
//! Provides error classification for outbound calls with retry metadata.
//! `should_retry` is the single transient-failure rule used by the HTTP
//! transport.

use pinesync_domain::ConnectorError;
use thiserror::Error;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication errors (401, 403) - static keys, never retried
    Authentication,
    /// Rate limiting errors (429) - retry with backoff
    RateLimit,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx except auth and 429) - non-retryable
    Client,
    /// Network/connection errors - retryable
    Network,
    /// Configuration errors and cancellation - non-retryable
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ApiError {
    /// Classify an HTTP status. Non-error statuses map to `Client`.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Auth { status, message },
            429 => Self::RateLimit(message),
            500..=599 => Self::Server { status, message },
            _ => Self::Client { status, message },
        }
    }

    /// Get the error category for this error
    pub const fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth { .. } => ApiErrorCategory::Authentication,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Client { .. } => ApiErrorCategory::Client,
            Self::Network(_) => ApiErrorCategory::Network,
            Self::Config(_) | Self::Cancelled => ApiErrorCategory::Config,
        }
    }

    /// Check if this error should be retried
    pub const fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            ApiErrorCategory::RateLimit | ApiErrorCategory::Server | ApiErrorCategory::Network
        )
    }

    /// Best-known status code; 500 when the transport gave none.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Auth { status, .. } | Self::Server { status, .. } | Self::Client { status, .. } => {
                *status
            }
            Self::RateLimit(_) => 429,
            Self::Cancelled => 499,
            Self::Network(_) | Self::Config(_) => 500,
        }
    }
}

impl From<ApiError> for ConnectorError {
    fn from(err: ApiError) -> Self {
        let status = err.status_code();
        match err {
            ApiError::Auth { message, .. } => Self::Auth(format!("HTTP {status}: {message}")),
            ApiError::RateLimit(message)
            | ApiError::Server { message, .. }
            | ApiError::Client { message, .. } => Self::Api { status, message },
            ApiError::Network(message) => Self::Network(message),
            ApiError::Config(message) => Self::Config(message),
            ApiError::Cancelled => Self::Cancelled,
        }
    }
}
