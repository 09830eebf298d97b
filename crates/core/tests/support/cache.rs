use std::sync::Mutex;

use async_trait::async_trait;
use pinesync_core::CacheWriter;
use pinesync_domain::{CacheSyncCollection, ObjectKind, Result};

/// Cache writer that keeps every applied collection.
#[derive(Default)]
pub struct InMemoryCacheWriter {
    applied: Mutex<Vec<CacheSyncCollection>>,
}

impl InMemoryCacheWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> Vec<CacheSyncCollection> {
        self.applied.lock().unwrap().clone()
    }

    pub fn keys_for(&self, kind: ObjectKind) -> Vec<String> {
        self.applied
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.kind == kind)
            .flat_map(|c| c.changes.iter().map(|op| op.key.clone()))
            .collect()
    }
}

#[async_trait]
impl CacheWriter for InMemoryCacheWriter {
    async fn apply(&self, collection: CacheSyncCollection) -> Result<()> {
        self.applied.lock().unwrap().push(collection);
        Ok(())
    }
}
