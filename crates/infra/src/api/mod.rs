//! Remote vector-database API
//!
//! The multi-endpoint [`VectorDbClient`] addresses the vector, index and
//! embed services with their own credentials. Every call goes through the
//! retrying [`HttpClient`](crate::http::HttpClient) and the [`ApiKeyAuth`]
//! injector, and comes back as an `ApiResponse` envelope.

pub mod auth;
pub mod client;
pub mod errors;
pub mod types;

pub use auth::{ApiKeyAuth, RequestAuthenticator};
pub use client::{EndpointClient, RawResponse, VectorDbClient};
pub use errors::{ApiError, ApiErrorCategory};
