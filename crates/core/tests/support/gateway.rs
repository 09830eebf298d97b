use std::sync::Mutex;

use async_trait::async_trait;
use pinesync_core::VectorDbGateway;
use pinesync_domain::{
    ApiResponse, ConnectorError, EmbedRecord, IndexRecord, Result, VectorPage, VectorRecord,
};
use tokio_util::sync::CancellationToken;

/// Scripted gateway. Mutations echo their input unless a failure status or
/// a transport error has been configured.
#[derive(Default)]
pub struct FakeGateway {
    indexes: Mutex<Vec<IndexRecord>>,
    vectors: Mutex<Vec<VectorRecord>>,
    failure: Mutex<Option<(u16, String)>>,
    transport_error: Mutex<Option<ConnectorError>>,
    embed_body: Mutex<Option<Vec<u8>>>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indexes(self, indexes: Vec<IndexRecord>) -> Self {
        *self.indexes.lock().unwrap() = indexes;
        self
    }

    pub fn with_vectors(self, vectors: Vec<VectorRecord>) -> Self {
        *self.vectors.lock().unwrap() = vectors;
        self
    }

    /// Mutating calls answer with a failed envelope.
    pub fn failing_with(self, status: u16, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some((status, message.to_string()));
        self
    }

    /// Every call returns `Err(err)`.
    pub fn erroring(self, err: ConnectorError) -> Self {
        *self.transport_error.lock().unwrap() = Some(err);
        self
    }

    pub fn with_embed_body(self, body: &str) -> Self {
        *self.embed_body.lock().unwrap() = Some(body.as_bytes().to_vec());
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, call: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.transport_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn echo<T>(&self, value: T) -> ApiResponse<T> {
        match self.failure.lock().unwrap().clone() {
            Some((status, message)) => {
                ApiResponse::failure(status, Some(message.clone()), Some(message.into_bytes()))
            }
            None => ApiResponse::success(200, value),
        }
    }
}

#[async_trait]
impl VectorDbGateway for FakeGateway {
    async fn upsert_vector(
        &self,
        vector: &VectorRecord,
        _cancel: &CancellationToken,
    ) -> Result<ApiResponse<VectorRecord>> {
        self.enter("upsert_vector")?;
        Ok(self.echo(vector.clone()))
    }

    async fn create_index(
        &self,
        index: &IndexRecord,
        _cancel: &CancellationToken,
    ) -> Result<ApiResponse<IndexRecord>> {
        self.enter("create_index")?;
        Ok(self.echo(index.clone()))
    }

    async fn list_indexes(&self, _cancel: &CancellationToken) -> Result<ApiResponse<Vec<IndexRecord>>> {
        self.enter("list_indexes")?;
        Ok(ApiResponse::success(200, self.indexes.lock().unwrap().clone()))
    }

    async fn delete_index(&self, _name: &str, _cancel: &CancellationToken) -> Result<ApiResponse<()>> {
        self.enter("delete_index")?;
        Ok(self.echo(()).discard_data())
    }

    async fn generate_embeddings(
        &self,
        embed: &EmbedRecord,
        _cancel: &CancellationToken,
    ) -> Result<ApiResponse<EmbedRecord>> {
        self.enter("generate_embeddings")?;
        let response = self.echo(embed.clone());
        Ok(match self.embed_body.lock().unwrap().clone() {
            Some(body) if response.is_successful() => response.with_raw(body),
            _ => response,
        })
    }

    async fn test_connection(&self, _cancel: &CancellationToken) -> Result<ApiResponse<()>> {
        self.enter("test_connection")?;
        Ok(self.echo(()).discard_data())
    }

    async fn list_vector_ids(
        &self,
        _namespace: Option<&str>,
        _limit: Option<u32>,
        _pagination_token: Option<&str>,
        _cancel: &CancellationToken,
    ) -> Result<ApiResponse<VectorPage>> {
        self.enter("list_vector_ids")?;
        let ids = self.vectors.lock().unwrap().iter().map(|v| v.id.clone()).collect();
        Ok(ApiResponse::success(200, VectorPage { ids, next_token: None }))
    }

    async fn fetch_vectors(
        &self,
        ids: &[String],
        _namespace: Option<&str>,
        _cancel: &CancellationToken,
    ) -> Result<ApiResponse<Vec<VectorRecord>>> {
        self.enter("fetch_vectors")?;
        let vectors = self.vectors.lock().unwrap();
        let found = ids.iter().filter_map(|id| vectors.iter().find(|v| &v.id == id).cloned()).collect();
        Ok(ApiResponse::success(200, found))
    }
}
