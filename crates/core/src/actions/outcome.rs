//! Handler outcomes reported back to the host

use pinesync_domain::{ApiResponse, CacheSyncCollection, ConnectorError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionErrorDetail {
    pub source: String,
    pub text: String,
}

/// Structured failure: a status-like code plus messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFailure {
    pub code: String,
    pub errors: Vec<ActionErrorDetail>,
}

impl ActionFailure {
    pub fn new(code: impl ToString, source: &str, text: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            errors: vec![ActionErrorDetail { source: source.to_string(), text: text.into() }],
        }
    }

    pub fn invalid_input(source: &str, text: impl Into<String>) -> Self {
        Self::new(400, source, text)
    }

    pub fn from_error(source: &str, err: &ConnectorError) -> Self {
        Self::new(err.status_code(), source, err.to_string())
    }

    /// Failure for a non-2xx envelope: remote status, remote message.
    pub fn from_response<T>(source: &str, response: &ApiResponse<T>, fallback: &str) -> Self {
        let text = response.error_message().map_or_else(|| fallback.to_string(), str::to_string);
        Self::new(response.status(), source, text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome<O> {
    Succeeded { output: O, sync: CacheSyncCollection },
    Failed(ActionFailure),
}

impl<O> ActionOutcome<O> {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub const fn output(&self) -> Option<&O> {
        match self {
            Self::Succeeded { output, .. } => Some(output),
            Self::Failed(_) => None,
        }
    }

    pub const fn sync(&self) -> Option<&CacheSyncCollection> {
        match self {
            Self::Succeeded { sync, .. } => Some(sync),
            Self::Failed(_) => None,
        }
    }

    pub const fn failure(&self) -> Option<&ActionFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            Self::Succeeded { .. } => None,
        }
    }
}

/// Cancellation and configuration errors propagate; anything else becomes
/// a failed outcome carrying the error's status code.
pub(crate) fn fail_or_propagate<O>(source: &str, err: ConnectorError) -> Result<ActionOutcome<O>> {
    match err {
        ConnectorError::Cancelled | ConnectorError::Config(_) => Err(err),
        other => Ok(ActionOutcome::Failed(ActionFailure::from_error(source, &other))),
    }
}
