//! Upsert-vector action

use std::sync::Arc;

use async_trait::async_trait;
use pinesync_domain::constants::MAX_VECTOR_ID_LENGTH;
use pinesync_domain::{CacheSyncCollection, DataObject, Result, SyncOperation, VectorRecord};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::outcome::{fail_or_propagate, ActionFailure, ActionOutcome};
use super::ports::{ActionHandler, VectorDbGateway};
use crate::sync::KeyResolverRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertVectorOutput {
    pub id: String,
    pub namespace: Option<String>,
}

fn validate(vector: &VectorRecord) -> std::result::Result<(), String> {
    let id_len = vector.id.chars().count();
    if id_len == 0 || id_len > MAX_VECTOR_ID_LENGTH {
        return Err(format!("id must be 1..={MAX_VECTOR_ID_LENGTH} characters"));
    }
    if vector.values.is_empty() {
        return Err("values must not be empty".to_string());
    }
    if let Some(sparse) = &vector.sparse_values {
        if sparse.indices.len() != sparse.values.len() {
            return Err("sparse_values indices and values must have the same length".to_string());
        }
    }
    Ok(())
}

pub struct UpsertVectorHandler {
    gateway: Arc<dyn VectorDbGateway>,
    resolvers: KeyResolverRegistry<VectorRecord>,
}

impl UpsertVectorHandler {
    pub fn new(gateway: Arc<dyn VectorDbGateway>) -> Self {
        Self { gateway, resolvers: KeyResolverRegistry::new() }
    }

    #[must_use]
    pub fn with_resolvers(mut self, resolvers: KeyResolverRegistry<VectorRecord>) -> Self {
        self.resolvers = resolvers;
        self
    }
}

#[async_trait]
impl ActionHandler for UpsertVectorHandler {
    type Input = VectorRecord;
    type Output = UpsertVectorOutput;

    const NAME: &'static str = "UpsertVectorHandler";

    #[instrument(skip(self, input, cancel), fields(vector_id = %input.id))]
    async fn handle(
        &self,
        input: VectorRecord,
        cancel: &CancellationToken,
    ) -> Result<ActionOutcome<UpsertVectorOutput>> {
        if let Err(reason) = validate(&input) {
            return Ok(ActionOutcome::Failed(ActionFailure::invalid_input(Self::NAME, reason)));
        }

        let response = match self.gateway.upsert_vector(&input, cancel).await {
            Ok(response) => response,
            Err(err) => return fail_or_propagate(Self::NAME, err),
        };

        if !response.is_successful() {
            return Ok(ActionOutcome::Failed(ActionFailure::from_response(
                Self::NAME,
                &response,
                "Failed to upsert vector",
            )));
        }

        let stored = response.into_data().unwrap_or(input);
        let output = UpsertVectorOutput { id: stored.id.clone(), namespace: stored.namespace.clone() };

        let identity = match self.resolvers.resolve(&VectorRecord::KIND.data_path(), &stored) {
            Ok(identity) => identity,
            Err(err) => return fail_or_propagate(Self::NAME, err.into()),
        };
        let mut sync = CacheSyncCollection::new(VectorRecord::KIND);
        sync.push(SyncOperation::upsert(identity, stored.into_payload()));

        info!("vector_upserted");
        Ok(ActionOutcome::Succeeded { output, sync })
    }
}

#[cfg(test)]
mod tests {
    use pinesync_domain::SparseValues;

    use super::*;

    #[test]
    fn rejects_empty_id_and_values() {
        assert!(validate(&VectorRecord::new("", vec![1.0])).is_err());
        assert!(validate(&VectorRecord::new("v", vec![])).is_err());
        assert!(validate(&VectorRecord::new("v", vec![1.0])).is_ok());
    }

    #[test]
    fn rejects_overlong_id() {
        let id = "v".repeat(MAX_VECTOR_ID_LENGTH + 1);
        assert!(validate(&VectorRecord::new(id, vec![1.0])).is_err());
    }

    #[test]
    fn rejects_mismatched_sparse_values() {
        let mut vector = VectorRecord::new("v", vec![1.0]);
        vector.sparse_values = Some(SparseValues { indices: vec![1, 2], values: vec![0.5] });
        assert!(validate(&vector).is_err());
    }
}
