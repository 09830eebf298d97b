use std::sync::Arc;

use async_stream::stream;
use futures::stream::BoxStream;
use pinesync_core::actions::decode_embeddings;
use pinesync_core::{DataReader, RunArguments, VectorDbGateway};
use pinesync_domain::{
    embed_batch_id, EmbedCacheConfig, EmbedEndpointConfig, EmbedInput, EmbedRecord,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Regenerates embeddings for the configured seed texts, one record per
/// chunk of `max_batch_size` inputs.
pub struct EmbedReader {
    gateway: Arc<dyn VectorDbGateway>,
    model: String,
    max_batch_size: usize,
    inputs: Vec<String>,
}

impl EmbedReader {
    pub fn new(
        gateway: Arc<dyn VectorDbGateway>,
        endpoint: &EmbedEndpointConfig,
        cache: &EmbedCacheConfig,
    ) -> Self {
        Self {
            gateway,
            model: endpoint.default_model.clone(),
            max_batch_size: endpoint.max_batch_size.max(1),
            inputs: cache.inputs.clone(),
        }
    }

    fn batches(&self) -> Vec<EmbedRecord> {
        self.inputs
            .chunks(self.max_batch_size)
            .map(|chunk| {
                let id = embed_batch_id(&self.model, chunk.iter().map(String::as_str));
                let inputs = chunk.iter().map(EmbedInput::new).collect();
                EmbedRecord::new(id, self.model.clone(), inputs)
            })
            .collect()
    }
}

impl DataReader<EmbedRecord> for EmbedReader {
    fn get_data(&self, args: RunArguments, cancel: CancellationToken) -> BoxStream<'_, EmbedRecord> {
        Box::pin(stream! {
            tokio::task::yield_now().await;

            for (batch_number, request) in self.batches().into_iter().enumerate() {
                if cancel.is_cancelled() {
                    return;
                }

                let response = match self.gateway.generate_embeddings(&request, &cancel).await {
                    Ok(response) if response.is_successful() => response,
                    Ok(response) => {
                        warn!(
                            run_id = %args.run_id,
                            batch = batch_number,
                            status = response.status(),
                            detail = %response.failure_detail(),
                            "embed_reader_aborted"
                        );
                        return;
                    }
                    Err(err) => {
                        warn!(run_id = %args.run_id, batch = batch_number, error = %err, "embed_reader_aborted");
                        return;
                    }
                };

                let embeddings = response
                    .raw_result()
                    .and_then(decode_embeddings)
                    .filter(|vectors| vectors.len() == request.inputs.len());
                let Some(embeddings) = embeddings else {
                    warn!(run_id = %args.run_id, batch = batch_number, "embed response missing vectors");
                    return;
                };

                let mut record = response.into_data().unwrap_or(request);
                record.embeddings = embeddings;
                debug!(run_id = %args.run_id, batch = batch_number, id = %record.id, "embed_batch_generated");
                yield record;
            }
        })
    }
}
