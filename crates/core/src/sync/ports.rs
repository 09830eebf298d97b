//! Port interfaces for cache synchronization

use async_trait::async_trait;
use futures::stream::BoxStream;
use pinesync_domain::{CacheSyncCollection, Result};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Per-run parameters handed to every data reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunArguments {
    pub run_id: Uuid,
    /// Overrides the configured vector namespace for this run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Overrides the configured page size for this run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_limit: Option<u32>,
}

impl RunArguments {
    pub fn new() -> Self {
        Self { run_id: Uuid::new_v4(), namespace: None, page_limit: None }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub const fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = Some(limit);
        self
    }
}

impl Default for RunArguments {
    fn default() -> Self {
        Self::new()
    }
}

/// Produces the current remote state of one object kind.
///
/// The stream is lazy, finite and not restartable: calling `get_data` again
/// re-issues the remote fetches. It observes `cancel` between pages and
/// items, and ends early instead of yielding partial objects when the
/// remote side fails.
pub trait DataReader<T>: Send + Sync {
    fn get_data(&self, args: RunArguments, cancel: CancellationToken) -> BoxStream<'_, T>;
}

/// Applies assembled collections to the host cache.
#[async_trait]
pub trait CacheWriter: Send + Sync {
    /// Apply one collection. Last-write-wins for duplicate keys is the
    /// writer's concern.
    async fn apply(&self, collection: CacheSyncCollection) -> Result<()>;
}
