//! Data readers over the remote gateway
//!
//! One reader per object kind. Each returns a lazy stream that yields to the
//! scheduler before doing any work, checks the cancellation token between
//! pages and items, and ends early (with a warning) instead of yielding
//! partial results when the remote side fails.

pub mod embed;
pub mod index;
pub mod vector;

pub use embed::EmbedReader;
pub use index::IndexReader;
pub use vector::VectorReader;
