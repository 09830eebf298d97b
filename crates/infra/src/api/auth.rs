//! Request authentication
//!
//! The authenticator runs on every attempt, immediately before the request
//! is sent, so retried requests carry fresh headers.

use pinesync_domain::constants::{API_KEY_HEADER, API_VERSION_HEADER};
use reqwest::header::{HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_TYPE};
use reqwest::Request;

use crate::api::errors::ApiError;

/// Attaches credentials and required headers to an outbound request.
pub trait RequestAuthenticator: Send + Sync {
    /// Fails with [`ApiError::Config`] when no credentials are configured.
    fn authenticate(&self, request: &mut Request) -> Result<(), ApiError>;
}

/// API-key authentication for the vector-database service.
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: String,
    api_version: String,
}

impl ApiKeyAuth {
    pub fn new(api_key: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), api_version: api_version.into() }
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Header value for the key, marked sensitive so it never shows up in
    /// debug output.
    pub fn key_header(&self) -> Result<HeaderValue, ApiError> {
        if !self.has_key() {
            return Err(ApiError::Config("API key is not configured".to_string()));
        }
        let mut value = HeaderValue::from_str(self.api_key.trim())
            .map_err(|_| ApiError::Config("API key contains invalid header characters".to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }

    pub fn version_header(&self) -> Result<HeaderValue, ApiError> {
        HeaderValue::from_str(&self.api_version)
            .map_err(|_| ApiError::Config(format!("invalid API version `{}`", self.api_version)))
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("api_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl RequestAuthenticator for ApiKeyAuth {
    fn authenticate(&self, request: &mut Request) -> Result<(), ApiError> {
        let key = self.key_header()?;
        let version = self.version_header()?;
        let has_body = request.body().is_some();

        let headers = request.headers_mut();
        headers.insert(api_key_header_name(), key);
        headers.insert(api_version_header_name(), version);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Ok(())
    }
}

pub(crate) fn api_key_header_name() -> HeaderName {
    HeaderName::from_static(API_KEY_HEADER)
}

pub(crate) fn api_version_header_name() -> HeaderName {
    HeaderName::from_static(API_VERSION_HEADER)
}
