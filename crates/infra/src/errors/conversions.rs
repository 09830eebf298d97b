//! Conversions from transport errors into API errors.

use reqwest::Error as HttpError;

use crate::api::errors::ApiError;

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ApiError */
/* -------------------------------------------------------------------------- */

/// Classify a transport failure, keeping the status when reqwest has one.
pub fn classify_http_error(err: &HttpError) -> ApiError {
    if let Some(status) = err.status() {
        let code = status.as_u16();
        let message =
            format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
        return ApiError::from_status(code, message);
    }

    if err.is_timeout() {
        return ApiError::Network("HTTP request timed out".into());
    }

    #[cfg(not(target_arch = "wasm32"))]
    if err.is_connect() {
        return ApiError::Network("HTTP connection failure".into());
    }

    if err.is_builder() {
        return ApiError::Config(format!("invalid HTTP request: {err}"));
    }

    ApiError::Network(err.to_string())
}

impl From<HttpError> for ApiError {
    fn from(value: HttpError) -> Self {
        classify_http_error(&value)
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
