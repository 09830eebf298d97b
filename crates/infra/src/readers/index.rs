use std::sync::Arc;

use async_stream::stream;
use futures::stream::BoxStream;
use pinesync_core::{DataReader, RunArguments, VectorDbGateway};
use pinesync_domain::IndexRecord;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Lists every index visible to the index-management credentials.
pub struct IndexReader {
    gateway: Arc<dyn VectorDbGateway>,
}

impl IndexReader {
    pub fn new(gateway: Arc<dyn VectorDbGateway>) -> Self {
        Self { gateway }
    }
}

impl DataReader<IndexRecord> for IndexReader {
    fn get_data(&self, args: RunArguments, cancel: CancellationToken) -> BoxStream<'_, IndexRecord> {
        Box::pin(stream! {
            tokio::task::yield_now().await;
            if cancel.is_cancelled() {
                return;
            }

            let response = match self.gateway.list_indexes(&cancel).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(run_id = %args.run_id, error = %err, "index_reader_aborted");
                    return;
                }
            };
            if !response.is_successful() {
                warn!(
                    run_id = %args.run_id,
                    status = response.status(),
                    detail = %response.failure_detail(),
                    "index_reader_aborted"
                );
                return;
            }

            let indexes = response.into_data().unwrap_or_default();
            debug!(run_id = %args.run_id, count = indexes.len(), "index_reader_listed");
            for index in indexes {
                if cancel.is_cancelled() {
                    return;
                }
                yield index;
            }
        })
    }
}
