//! Connector constants
//!
//! Centralized location for wire-level names and defaults shared by every
//! crate in the workspace.

// Remote API headers, lowercase as `HeaderName::from_static` requires
pub const API_KEY_HEADER: &str = "api-key";
pub const API_VERSION_HEADER: &str = "x-pinecone-api-version";
pub const DEFAULT_API_VERSION: &str = "2024-10";

// HTTP transport
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_BASE: u32 = 2;
pub const DEFAULT_DELAY_UNIT_MS: u64 = 1000;

// Embedding generation
pub const DEFAULT_EMBED_MODEL: &str = "multilingual-e5-large";
pub const DEFAULT_EMBED_MAX_BATCH_SIZE: usize = 100;
pub const MAX_EMBED_BATCH_SIZE: usize = 2048;
pub const DEFAULT_EMBED_TRUNCATE: &str = "END";

// Vector listing
pub const DEFAULT_VECTOR_PAGE_SIZE: u32 = 100;
pub const MAX_VECTOR_ID_LENGTH: usize = 512;

// Index validation
pub const MAX_INDEX_NAME_LENGTH: usize = 45;
pub const MIN_INDEX_DIMENSION: u32 = 2;
pub const MAX_INDEX_DIMENSION: u32 = 19_999;

// Identity resolution
pub const IDENTITY_FIELD: &str = "Id";
pub const DATA_PATH_PREFIX: &str = "pinecone/app/1";
