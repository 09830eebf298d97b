//! Application context - dependency injection container
//!
//! Owns the loaded configuration and the single shared API client; every
//! reader and handler built here borrows that client so connection pools
//! and credentials are shared across a run.

use std::path::PathBuf;
use std::sync::Arc;

use pinesync_core::{
    CacheWriter, ConnectionTestHandler, CreateEmbedHandler, CreateIndexHandler, DeleteIndexHandler,
    KeyResolverRegistry, SyncPipeline, UpsertVectorHandler, VectorDbGateway,
};
use pinesync_domain::{ConnectorConfig, EmbedRecord, IndexRecord, Result, VectorRecord};
use pinesync_infra::{config, EmbedReader, IndexReader, VectorDbClient, VectorReader};
use tracing::info;

pub struct AppContext {
    config: Arc<ConnectorConfig>,
    client: Arc<VectorDbClient>,
    index_resolvers: KeyResolverRegistry<IndexRecord>,
    vector_resolvers: KeyResolverRegistry<VectorRecord>,
    embed_resolvers: KeyResolverRegistry<EmbedRecord>,
}

impl AppContext {
    pub fn new(config: ConnectorConfig) -> Self {
        let config = Arc::new(config);
        let client = Arc::new(VectorDbClient::new(Arc::clone(&config)));
        Self {
            config,
            client,
            index_resolvers: KeyResolverRegistry::new(),
            vector_resolvers: KeyResolverRegistry::new(),
            embed_resolvers: KeyResolverRegistry::new(),
        }
    }

    /// Load configuration from `path`, or from the environment with file
    /// fallback when no path is given.
    ///
    /// # Errors
    /// Returns `ConnectorError::Config` when no source yields a valid config.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let config = config::load_from_file(Some(path))?;
                config.validate()?;
                config
            }
            None => config::load()?,
        };
        info!(
            sync_indexes = config.cache_writer.index.upload_object,
            sync_vectors = config.cache_writer.vector.upload_object,
            sync_embeds = config.cache_writer.embed.upload_object,
            "app_context_initialized"
        );
        Ok(Self::new(config))
    }

    /// Replace the default (`Id` field) resolver registries.
    #[must_use]
    pub fn with_resolvers(
        mut self,
        index: KeyResolverRegistry<IndexRecord>,
        vector: KeyResolverRegistry<VectorRecord>,
        embed: KeyResolverRegistry<EmbedRecord>,
    ) -> Self {
        self.index_resolvers = index;
        self.vector_resolvers = vector;
        self.embed_resolvers = embed;
        self
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn client(&self) -> Arc<VectorDbClient> {
        Arc::clone(&self.client)
    }

    fn gateway(&self) -> Arc<dyn VectorDbGateway> {
        self.client()
    }

    /// Pipeline with one reader per kind whose cache upload is enabled.
    pub fn sync_pipeline(&self, writer: Arc<dyn CacheWriter>) -> SyncPipeline {
        let cache = &self.config.cache_writer;
        let mut pipeline = SyncPipeline::new(writer);

        if cache.index.upload_object {
            pipeline =
                pipeline.register(Arc::new(IndexReader::new(self.gateway())), &self.index_resolvers);
        }
        if cache.vector.upload_object {
            pipeline = pipeline.register(
                Arc::new(VectorReader::new(self.gateway(), &cache.vector)),
                &self.vector_resolvers,
            );
        }
        if cache.embed.upload_object {
            pipeline = pipeline.register(
                Arc::new(EmbedReader::new(
                    self.gateway(),
                    &self.config.action_processor.embed,
                    &cache.embed,
                )),
                &self.embed_resolvers,
            );
        }
        pipeline
    }

    pub fn connection_test_handler(&self) -> ConnectionTestHandler {
        ConnectionTestHandler::new(self.gateway())
    }

    pub fn create_index_handler(&self) -> CreateIndexHandler {
        CreateIndexHandler::new(self.gateway()).with_resolvers(self.index_resolvers.clone())
    }

    pub fn delete_index_handler(&self) -> DeleteIndexHandler {
        DeleteIndexHandler::new(self.gateway()).with_resolvers(self.index_resolvers.clone())
    }

    pub fn upsert_vector_handler(&self) -> UpsertVectorHandler {
        UpsertVectorHandler::new(self.gateway()).with_resolvers(self.vector_resolvers.clone())
    }

    pub fn create_embed_handler(&self) -> CreateEmbedHandler {
        CreateEmbedHandler::new(self.gateway(), &self.config.action_processor.embed)
            .with_resolvers(self.embed_resolvers.clone())
    }
}
