//! HTTP transport
//!
//! [`HttpClient`] wraps reqwest with the shared [`RetryPolicy`]. Every
//! outbound call in the connector goes through it.

pub mod client;
pub mod retry;

pub use client::{HttpClient, HttpClientBuilder};
pub use retry::{BackoffStrategy, RetryDecision, RetryPolicy};
