//! Response envelope wrapping the outcome of every outbound call
//!
//! Fields are private so the envelope cannot be built with data on a failed
//! call. A body, when the service sent one, is always kept in `raw_result`
//! so callers can decode shapes the typed mapping does not cover.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    is_successful: bool,
    status: u16,
    data: Option<T>,
    error_message: Option<String>,
    raw_result: Option<Vec<u8>>,
}

impl<T> ApiResponse<T> {
    /// Successful call carrying a typed payload.
    pub const fn success(status: u16, data: T) -> Self {
        Self { is_successful: true, status, data: Some(data), error_message: None, raw_result: None }
    }

    /// Successful call with no typed payload (e.g. `204 No Content`).
    pub const fn empty_success(status: u16) -> Self {
        Self { is_successful: true, status, data: None, error_message: None, raw_result: None }
    }

    /// Failed call. Never carries data.
    pub fn failure(status: u16, error_message: Option<String>, raw_result: Option<Vec<u8>>) -> Self {
        Self {
            is_successful: false,
            status,
            data: None,
            error_message: error_message.filter(|m| !m.is_empty()),
            raw_result: raw_result.filter(|r| !r.is_empty()),
        }
    }

    /// Attach the response body. Empty bodies are dropped.
    #[must_use]
    pub fn with_raw(mut self, raw: Vec<u8>) -> Self {
        if !raw.is_empty() {
            self.raw_result = Some(raw);
        }
        self
    }

    pub const fn is_successful(&self) -> bool {
        self.is_successful
    }

    pub const fn status(&self) -> u16 {
        self.status
    }

    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn raw_result(&self) -> Option<&[u8]> {
        self.raw_result.as_deref()
    }

    /// Body as text, lossily decoded.
    pub fn raw_text(&self) -> Option<String> {
        self.raw_result.as_deref().map(|raw| String::from_utf8_lossy(raw).into_owned())
    }

    /// Best diagnostic for a failed call: the error message, else the body.
    pub fn failure_detail(&self) -> String {
        self.error_message
            .clone()
            .or_else(|| self.raw_text())
            .unwrap_or_else(|| format!("remote returned status {}", self.status))
    }

    /// Transform the payload, keeping status and diagnostics.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            is_successful: self.is_successful,
            status: self.status,
            data: self.data.map(f),
            error_message: self.error_message,
            raw_result: self.raw_result,
        }
    }

    /// Drop the payload, keeping status and diagnostics.
    pub fn discard_data(self) -> ApiResponse<()> {
        ApiResponse {
            is_successful: self.is_successful,
            status: self.status,
            data: None,
            error_message: self.error_message,
            raw_result: self.raw_result,
        }
    }
}

/// `true` for any 2xx status.
pub const fn is_success_status(status: u16) -> bool {
    status >= 200 && status < 300
}
