//! # Pinesync Domain
//!
//! Pure data types for the vector-database cache connector.
//!
//! This crate contains:
//! - Domain records (vectors, indexes, embedding batches)
//! - The response envelope returned by every outbound call
//! - Identity and cache-sync shapes handed to the cache writer
//! - Configuration value types
//! - The crate-wide error enum and `Result` alias
//!
//! ## Architecture
//! - No dependencies on other Pinesync crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
