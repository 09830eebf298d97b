//! JSON-lines cache writer
//!
//! Each applied collection becomes one line:
//! `{"written_at": "...", "kind": "index", "changes": [...]}`.
//! The host cache consumes the stream in order; duplicate keys resolve
//! last-write-wins on its side.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use pinesync_core::CacheWriter;
use pinesync_domain::{CacheSyncCollection, ConnectorError, Result};
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct CollectionLine<'a> {
    written_at: String,
    #[serde(flatten)]
    collection: &'a CacheSyncCollection,
}

pub struct JsonLinesCacheWriter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesCacheWriter<W> {
    pub const fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    /// Consume the writer and hand back the sink.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl JsonLinesCacheWriter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl JsonLinesCacheWriter<BufWriter<File>> {
    /// Append to `path`, creating it if needed.
    pub fn append_to(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path).map_err(|e| {
            ConnectorError::Config(format!("cannot open cache output {}: {e}", path.display()))
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

#[async_trait]
impl<W: Write + Send + 'static> CacheWriter for JsonLinesCacheWriter<W> {
    async fn apply(&self, collection: CacheSyncCollection) -> Result<()> {
        let line = CollectionLine { written_at: Utc::now().to_rfc3339(), collection: &collection };
        let mut encoded = serde_json::to_vec(&line)
            .map_err(|e| ConnectorError::Internal(format!("cache line encoding failed: {e}")))?;
        encoded.push(b'\n');

        let mut out = self
            .out
            .lock()
            .map_err(|_| ConnectorError::Internal("cache writer lock poisoned".to_string()))?;
        out.write_all(&encoded)
            .and_then(|()| out.flush())
            .map_err(|e| ConnectorError::Internal(format!("cache write failed: {e}")))?;

        debug!(kind = %collection.kind, changes = collection.len(), "cache_collection_written");
        Ok(())
    }
}
