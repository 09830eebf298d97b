//! Shared fixtures for infra integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pinesync_core::CacheWriter;
use pinesync_domain::{CacheSyncCollection, ConnectorConfig, EndpointCredentials, ObjectKind, Result};
use pinesync_infra::VectorDbClient;
use wiremock::MockServer;

pub const VECTOR_KEY: &str = "vector-key";
pub const INDEX_KEY: &str = "index-key";
pub const EMBED_KEY: &str = "embed-key";

/// Config with all three endpoints on `server`, distinct keys per domain
/// and millisecond backoff (2ms, 4ms, 8ms).
pub fn config_for(server: &MockServer) -> ConnectorConfig {
    let mut config = ConnectorConfig::default();
    config.action_processor.vector = EndpointCredentials::new(server.uri(), VECTOR_KEY);
    config.action_processor.index = EndpointCredentials::new(server.uri(), INDEX_KEY);
    config.action_processor.embed.credentials = EndpointCredentials::new(server.uri(), EMBED_KEY);
    config.http.timeout_secs = 5;
    config.http.retry.delay_unit_ms = 1;
    config
}

pub fn client_for(server: &MockServer) -> Arc<VectorDbClient> {
    Arc::new(VectorDbClient::new(Arc::new(config_for(server))))
}

pub fn client_with(config: ConnectorConfig) -> Arc<VectorDbClient> {
    Arc::new(VectorDbClient::new(Arc::new(config)))
}

/// Cache writer that records every applied collection.
#[derive(Default)]
pub struct RecordingCacheWriter {
    applied: Mutex<Vec<CacheSyncCollection>>,
}

impl RecordingCacheWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> Vec<CacheSyncCollection> {
        self.applied.lock().expect("writer mutex poisoned").clone()
    }

    pub fn keys_for(&self, kind: ObjectKind) -> Vec<String> {
        self.applied()
            .iter()
            .filter(|c| c.kind == kind)
            .flat_map(|c| c.changes.iter().map(|op| op.key.clone()))
            .collect()
    }
}

#[async_trait]
impl CacheWriter for RecordingCacheWriter {
    async fn apply(&self, collection: CacheSyncCollection) -> Result<()> {
        self.applied.lock().expect("writer mutex poisoned").push(collection);
        Ok(())
    }
}
