use std::sync::Arc;

use async_stream::stream;
use futures::stream::BoxStream;
use pinesync_core::{DataReader, RunArguments, VectorDbGateway};
use pinesync_domain::{VectorCacheConfig, VectorRecord};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Pages through one namespace: list a page of ids, fetch the full records,
/// yield them, follow the pagination token.
///
/// A page is fetched completely before any of it is yielded, so a failed
/// fetch never leaves half a page behind.
pub struct VectorReader {
    gateway: Arc<dyn VectorDbGateway>,
    namespace: Option<String>,
    page_size: u32,
}

impl VectorReader {
    pub fn new(gateway: Arc<dyn VectorDbGateway>, config: &VectorCacheConfig) -> Self {
        Self { gateway, namespace: config.namespace.clone(), page_size: config.page_size.max(1) }
    }
}

impl DataReader<VectorRecord> for VectorReader {
    fn get_data(&self, args: RunArguments, cancel: CancellationToken) -> BoxStream<'_, VectorRecord> {
        let namespace = args.namespace.clone().or_else(|| self.namespace.clone());
        let limit = args.page_limit.unwrap_or(self.page_size).max(1);

        Box::pin(stream! {
            tokio::task::yield_now().await;
            let mut token: Option<String> = None;
            let mut page_number: u32 = 0;

            loop {
                if cancel.is_cancelled() {
                    return;
                }
                page_number += 1;

                let listing = match self
                    .gateway
                    .list_vector_ids(namespace.as_deref(), Some(limit), token.as_deref(), &cancel)
                    .await
                {
                    Ok(listing) if listing.is_successful() => listing,
                    Ok(listing) => {
                        warn!(
                            run_id = %args.run_id,
                            page = page_number,
                            status = listing.status(),
                            detail = %listing.failure_detail(),
                            "vector_reader_aborted"
                        );
                        return;
                    }
                    Err(err) => {
                        warn!(run_id = %args.run_id, page = page_number, error = %err, "vector_reader_aborted");
                        return;
                    }
                };
                let page = listing.into_data().unwrap_or_default();

                if !page.ids.is_empty() {
                    let fetched = match self
                        .gateway
                        .fetch_vectors(&page.ids, namespace.as_deref(), &cancel)
                        .await
                    {
                        Ok(fetched) if fetched.is_successful() => fetched,
                        Ok(fetched) => {
                            warn!(
                                run_id = %args.run_id,
                                page = page_number,
                                status = fetched.status(),
                                detail = %fetched.failure_detail(),
                                "vector_reader_aborted"
                            );
                            return;
                        }
                        Err(err) => {
                            warn!(run_id = %args.run_id, page = page_number, error = %err, "vector_reader_aborted");
                            return;
                        }
                    };

                    let records = fetched.into_data().unwrap_or_default();
                    debug!(run_id = %args.run_id, page = page_number, count = records.len(), "vector_page_fetched");
                    for record in records {
                        if cancel.is_cancelled() {
                            return;
                        }
                        yield record;
                    }
                }

                match page.next_token {
                    Some(next) if token.as_deref() != Some(next.as_str()) => token = Some(next),
                    Some(_) => {
                        warn!(run_id = %args.run_id, page = page_number, "pagination token did not advance");
                        return;
                    }
                    None => return,
                }
            }
        })
    }
}
