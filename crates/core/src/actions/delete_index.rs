//! Delete-index action

use std::sync::Arc;

use async_trait::async_trait;
use pinesync_domain::{CacheSyncCollection, DataObject, IndexRecord, Result, SyncOperation};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::outcome::{fail_or_propagate, ActionFailure, ActionOutcome};
use super::ports::{ActionHandler, VectorDbGateway};
use crate::sync::KeyResolverRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteIndexInput {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteIndexOutput {
    pub name: String,
}

/// Deletes an index and evicts its cache row.
pub struct DeleteIndexHandler {
    gateway: Arc<dyn VectorDbGateway>,
    resolvers: KeyResolverRegistry<IndexRecord>,
}

impl DeleteIndexHandler {
    pub fn new(gateway: Arc<dyn VectorDbGateway>) -> Self {
        Self { gateway, resolvers: KeyResolverRegistry::new() }
    }

    #[must_use]
    pub fn with_resolvers(mut self, resolvers: KeyResolverRegistry<IndexRecord>) -> Self {
        self.resolvers = resolvers;
        self
    }
}

#[async_trait]
impl ActionHandler for DeleteIndexHandler {
    type Input = DeleteIndexInput;
    type Output = DeleteIndexOutput;

    const NAME: &'static str = "DeleteIndexHandler";

    #[instrument(skip(self, input, cancel), fields(index = %input.name))]
    async fn handle(
        &self,
        input: DeleteIndexInput,
        cancel: &CancellationToken,
    ) -> Result<ActionOutcome<DeleteIndexOutput>> {
        if input.name.trim().is_empty() {
            return Ok(ActionOutcome::Failed(ActionFailure::invalid_input(
                Self::NAME,
                "name must not be empty",
            )));
        }

        let response = match self.gateway.delete_index(&input.name, cancel).await {
            Ok(response) => response,
            Err(err) => return fail_or_propagate(Self::NAME, err),
        };

        if !response.is_successful() {
            return Ok(ActionOutcome::Failed(ActionFailure::from_response(
                Self::NAME,
                &response,
                "Failed to delete index",
            )));
        }

        // Resolve through the same chain as upserts so the evicted key
        // matches the cached row.
        let target = IndexRecord { name: input.name.clone(), ..IndexRecord::default() };
        let identity = match self.resolvers.resolve(&IndexRecord::KIND.data_path(), &target) {
            Ok(identity) => identity,
            Err(err) => return fail_or_propagate(Self::NAME, err.into()),
        };
        let mut sync = CacheSyncCollection::new(IndexRecord::KIND);
        sync.push(SyncOperation::delete(identity));

        info!("index_deleted");
        Ok(ActionOutcome::Succeeded { output: DeleteIndexOutput { name: input.name }, sync })
    }
}
