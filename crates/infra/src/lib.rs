//! # Pinesync Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The retrying HTTP transport and its retry policy
//! - The API-key auth injector and the multi-endpoint API client
//! - Data readers for indexes, vectors and embeddings
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Implements traits defined in `pinesync-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod readers;

// Re-export commonly used items
pub use api::{ApiError, ApiKeyAuth, VectorDbClient};
pub use http::{HttpClient, RetryPolicy};
pub use readers::{EmbedReader, IndexReader, VectorReader};
