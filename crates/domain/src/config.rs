//! Configuration value types
//!
//! Loaded once at startup (see the infra loader) and shared read-only behind
//! an `Arc` for the lifetime of the process.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_VERSION, DEFAULT_BACKOFF_BASE, DEFAULT_DELAY_UNIT_MS, DEFAULT_EMBED_MAX_BATCH_SIZE,
    DEFAULT_EMBED_MODEL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_RETRIES, DEFAULT_VECTOR_PAGE_SIZE,
    MAX_EMBED_BATCH_SIZE,
};
use crate::errors::{ConnectorError, Result};

/// Base URL and API key for one remote sub-service.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCredentials {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

impl EndpointCredentials {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), api_key: api_key.into() }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// Keys must never reach logs.
impl fmt::Debug for EndpointCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointCredentials")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.has_api_key() { "<redacted>" } else { "<unset>" })
            .finish()
    }
}

/// Embedding endpoint credentials plus generation defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedEndpointConfig {
    #[serde(flatten)]
    pub credentials: EndpointCredentials,
    #[serde(default = "default_embed_model")]
    pub default_model: String,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for EmbedEndpointConfig {
    fn default() -> Self {
        Self {
            credentials: EndpointCredentials::default(),
            default_model: default_embed_model(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

/// Credentials for the three sub-services used by action handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionProcessorConfig {
    #[serde(default)]
    pub vector: EndpointCredentials,
    #[serde(default)]
    pub index: EndpointCredentials,
    #[serde(default)]
    pub embed: EmbedEndpointConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorCacheConfig {
    #[serde(default)]
    pub upload_object: bool,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for VectorCacheConfig {
    fn default() -> Self {
        Self { upload_object: false, namespace: None, page_size: default_page_size() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCacheConfig {
    #[serde(default)]
    pub upload_object: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedCacheConfig {
    #[serde(default)]
    pub upload_object: bool,
    /// Seed texts re-embedded on every sync run.
    #[serde(default)]
    pub inputs: Vec<String>,
}

/// Which object kinds the bulk sync pipeline reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheWriterConfig {
    #[serde(default)]
    pub vector: VectorCacheConfig,
    #[serde(default)]
    pub index: IndexCacheConfig,
    #[serde(default)]
    pub embed: EmbedCacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base")]
    pub backoff_base: u32,
    #[serde(default = "default_delay_unit_ms")]
    pub delay_unit_ms: u64,
    #[serde(default = "default_true")]
    pub use_exponential_backoff: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_base: default_backoff_base(),
            delay_unit_ms: default_delay_unit_ms(),
            use_exponential_backoff: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout_secs(), retry: RetryConfig::default() }
    }
}

/// Root configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    #[serde(default)]
    pub action_processor: ActionProcessorConfig,
    #[serde(default)]
    pub cache_writer: CacheWriterConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            action_processor: ActionProcessorConfig::default(),
            cache_writer: CacheWriterConfig::default(),
            http: HttpConfig::default(),
            api_version: default_api_version(),
        }
    }
}

impl ConnectorConfig {
    /// Reject values no component can work with.
    ///
    /// Missing API keys are not checked here; the auth injector refuses to
    /// send without one so that a partially configured connector can still
    /// serve the sub-services that are configured.
    pub fn validate(&self) -> Result<()> {
        let endpoints = [
            ("action_processor.vector", &self.action_processor.vector),
            ("action_processor.index", &self.action_processor.index),
            ("action_processor.embed", &self.action_processor.embed.credentials),
        ];
        for (name, creds) in endpoints {
            if creds.base_url.trim().is_empty() {
                return Err(ConnectorError::Config(format!("{name}.base_url must not be empty")));
            }
        }

        let batch = self.action_processor.embed.max_batch_size;
        if batch == 0 || batch > MAX_EMBED_BATCH_SIZE {
            return Err(ConnectorError::Config(format!(
                "action_processor.embed.max_batch_size must be within 1..={MAX_EMBED_BATCH_SIZE}, got {batch}"
            )));
        }

        if self.action_processor.embed.default_model.trim().is_empty() {
            return Err(ConnectorError::Config(
                "action_processor.embed.default_model must not be empty".to_string(),
            ));
        }

        let retry = &self.http.retry;
        if retry.use_exponential_backoff && retry.backoff_base < 2 {
            return Err(ConnectorError::Config(format!(
                "http.retry.backoff_base must be at least 2, got {}",
                retry.backoff_base
            )));
        }

        if self.http.timeout_secs == 0 {
            return Err(ConnectorError::Config("http.timeout_secs must be positive".to_string()));
        }

        if self.cache_writer.vector.page_size == 0 {
            return Err(ConnectorError::Config(
                "cache_writer.vector.page_size must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_embed_model() -> String {
    DEFAULT_EMBED_MODEL.to_string()
}

const fn default_max_batch_size() -> usize {
    DEFAULT_EMBED_MAX_BATCH_SIZE
}

const fn default_page_size() -> u32 {
    DEFAULT_VECTOR_PAGE_SIZE
}

const fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

const fn default_backoff_base() -> u32 {
    DEFAULT_BACKOFF_BASE
}

const fn default_delay_unit_ms() -> u64 {
    DEFAULT_DELAY_UNIT_MS
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

const fn default_true() -> bool {
    true
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}
