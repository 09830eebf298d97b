//! Generate-embeddings action

use std::sync::Arc;

use async_trait::async_trait;
use pinesync_domain::{
    embed_batch_id, CacheSyncCollection, DataObject, EmbedEndpointConfig, EmbedInput, EmbedParameters, EmbedRecord,
    Result, SyncOperation,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::outcome::{fail_or_propagate, ActionFailure, ActionOutcome};
use super::ports::{ActionHandler, VectorDbGateway};
use crate::sync::KeyResolverRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEmbedInput {
    pub inputs: Vec<EmbedInput>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub parameters: Option<EmbedParameters>,
}

impl CreateEmbedInput {
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: texts.into_iter().map(EmbedInput::new).collect(),
            model: None,
            parameters: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEmbedOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub model: String,
}

#[derive(Deserialize)]
struct EmbeddingsBody {
    #[serde(default)]
    data: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

/// Dense vectors from an embed response body, in input order. `None` when
/// the body is not an embed response.
pub fn decode_embeddings(raw: &[u8]) -> Option<Vec<Vec<f32>>> {
    let body: EmbeddingsBody = serde_json::from_slice(raw).ok()?;
    Some(body.data.into_iter().map(|item| item.values).collect())
}

pub struct CreateEmbedHandler {
    gateway: Arc<dyn VectorDbGateway>,
    resolvers: KeyResolverRegistry<EmbedRecord>,
    default_model: String,
    max_batch_size: usize,
}

impl CreateEmbedHandler {
    pub fn new(gateway: Arc<dyn VectorDbGateway>, config: &EmbedEndpointConfig) -> Self {
        Self {
            gateway,
            resolvers: KeyResolverRegistry::new(),
            default_model: config.default_model.clone(),
            max_batch_size: config.max_batch_size,
        }
    }

    #[must_use]
    pub fn with_resolvers(mut self, resolvers: KeyResolverRegistry<EmbedRecord>) -> Self {
        self.resolvers = resolvers;
        self
    }

    fn validate(&self, input: &CreateEmbedInput) -> std::result::Result<(), String> {
        let count = input.inputs.len();
        if count == 0 || count > self.max_batch_size {
            return Err(format!("inputs must contain 1..={} items, got {count}", self.max_batch_size));
        }
        Ok(())
    }

    fn build_record(&self, input: CreateEmbedInput) -> EmbedRecord {
        let model = input
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.default_model.clone());
        let id = embed_batch_id(&model, input.inputs.iter().map(|i| i.text.as_str()));
        EmbedRecord {
            id,
            inputs: input.inputs,
            model,
            parameters: input.parameters.unwrap_or_default(),
            embeddings: Vec::new(),
        }
    }
}

#[async_trait]
impl ActionHandler for CreateEmbedHandler {
    type Input = CreateEmbedInput;
    type Output = CreateEmbedOutput;

    const NAME: &'static str = "CreateEmbedHandler";

    #[instrument(skip(self, input, cancel), fields(inputs = input.inputs.len()))]
    async fn handle(
        &self,
        input: CreateEmbedInput,
        cancel: &CancellationToken,
    ) -> Result<ActionOutcome<CreateEmbedOutput>> {
        if let Err(reason) = self.validate(&input) {
            return Ok(ActionOutcome::Failed(ActionFailure::invalid_input(Self::NAME, reason)));
        }

        let record = self.build_record(input);
        let response = match self.gateway.generate_embeddings(&record, cancel).await {
            Ok(response) => response,
            Err(err) => return fail_or_propagate(Self::NAME, err),
        };

        if !response.is_successful() {
            return Ok(ActionOutcome::Failed(ActionFailure::from_response(
                Self::NAME,
                &response,
                "Failed to generate embeddings",
            )));
        }

        let embeddings = response.raw_result().and_then(decode_embeddings).unwrap_or_default();
        debug!(generated = embeddings.len(), "embeddings_decoded");

        let mut generated = response.into_data().unwrap_or(record);
        generated.embeddings = embeddings;
        let output =
            CreateEmbedOutput { embeddings: generated.embeddings.clone(), model: generated.model.clone() };

        let identity = match self.resolvers.resolve(&EmbedRecord::KIND.data_path(), &generated) {
            Ok(identity) => identity,
            Err(err) => return fail_or_propagate(Self::NAME, err.into()),
        };
        let mut sync = CacheSyncCollection::new(EmbedRecord::KIND);
        sync.push(SyncOperation::upsert(identity, generated.into_payload()));

        info!(model = %output.model, "embeddings_generated");
        Ok(ActionOutcome::Succeeded { output, sync })
    }
}
