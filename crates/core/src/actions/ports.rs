//! Port interfaces for action handlers

use async_trait::async_trait;
use pinesync_domain::{ApiResponse, EmbedRecord, IndexRecord, Result, VectorPage, VectorRecord};
use tokio_util::sync::CancellationToken;

use super::outcome::ActionOutcome;

/// Typed operations against the remote vector-database service.
///
/// Non-2xx answers come back as failed envelopes. `Err` is reserved for
/// transport failures that survived retries, missing configuration and
/// cancellation.
#[async_trait]
pub trait VectorDbGateway: Send + Sync {
    /// Upsert a single vector. Echoes the input on success.
    async fn upsert_vector(
        &self,
        vector: &VectorRecord,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<VectorRecord>>;

    /// Create an index. Echoes the input on success.
    async fn create_index(
        &self,
        index: &IndexRecord,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<IndexRecord>>;

    async fn list_indexes(&self, cancel: &CancellationToken) -> Result<ApiResponse<Vec<IndexRecord>>>;

    async fn delete_index(&self, name: &str, cancel: &CancellationToken) -> Result<ApiResponse<()>>;

    /// Generate embeddings. Echoes the input on success; the generated
    /// vectors stay in the raw body.
    async fn generate_embeddings(
        &self,
        embed: &EmbedRecord,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<EmbedRecord>>;

    /// Lightweight credentials/connectivity probe.
    async fn test_connection(&self, cancel: &CancellationToken) -> Result<ApiResponse<()>>;

    /// One page of vector ids in `namespace`.
    async fn list_vector_ids(
        &self,
        namespace: Option<&str>,
        limit: Option<u32>,
        pagination_token: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<VectorPage>>;

    /// Full records for `ids`, in the order given.
    async fn fetch_vectors(
        &self,
        ids: &[String],
        namespace: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<Vec<VectorRecord>>>;
}

/// A host action: validated input in, outcome (and cache update) out.
///
/// `Err` is returned only for cancellation and configuration errors.
/// Every other failure is reported as `ActionOutcome::Failed`.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Reported as the error source in failures.
    const NAME: &'static str;

    async fn handle(
        &self,
        input: Self::Input,
        cancel: &CancellationToken,
    ) -> Result<ActionOutcome<Self::Output>>;
}
