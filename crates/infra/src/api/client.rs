//! Multi-endpoint API client
//!
//! One façade over the three sub-services. Each call picks the credentials
//! for its domain, builds a fresh [`EndpointClient`] bound to that base URL
//! and normalizes the outcome into an [`ApiResponse`]. Non-2xx statuses
//! become failure envelopes; only transport errors, cancellation and
//! configuration problems surface as `Err`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pinesync_core::actions::VectorDbGateway;
use pinesync_domain::{
    ApiResponse, ConnectorConfig, ConnectorError, EmbedRecord, EndpointCredentials, IndexRecord,
    VectorPage, VectorRecord,
};
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use super::auth::{api_key_header_name, api_version_header_name, ApiKeyAuth};
use super::errors::ApiError;
use super::types::{
    CreateIndexRequest, EmbedRequest, FetchVectorsResponse, IndexListResponse,
    ListVectorsResponse, UpsertRequest,
};
use crate::errors::conversions::classify_http_error;
use crate::http::{HttpClient, RetryPolicy};

const USER_AGENT: &str = concat!("pinesync/", env!("CARGO_PKG_VERSION"));

/// Status and body of a completed exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub const fn is_success(&self) -> bool {
        pinesync_domain::is_success_status(self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Failure envelope keeping the body both as message and raw bytes.
    pub fn into_failure<T>(self) -> ApiResponse<T> {
        let message = self.text();
        ApiResponse::failure(self.status, Some(message), Some(self.body))
    }

    /// Success echoing `data`, or a failure envelope.
    pub fn into_echo<T>(self, data: T) -> ApiResponse<T> {
        if self.is_success() {
            ApiResponse::success(self.status, data).with_raw(self.body)
        } else {
            self.into_failure()
        }
    }

    /// Success without a typed payload, or a failure envelope.
    pub fn into_empty(self) -> ApiResponse<()> {
        if self.is_success() {
            ApiResponse::empty_success(self.status).with_raw(self.body)
        } else {
            self.into_failure()
        }
    }

    /// Success decoding the body as `R`. A 2xx body that does not decode is
    /// reported as a failure so `data` is never made up.
    pub fn into_decoded<R: DeserializeOwned>(self) -> ApiResponse<R> {
        self.into_converted(Ok)
    }

    /// Like [`into_decoded`](Self::into_decoded), then `convert`. A
    /// conversion error is reported the same way as an undecodable body.
    pub fn into_converted<R, T, F>(self, convert: F) -> ApiResponse<T>
    where
        R: DeserializeOwned,
        F: FnOnce(R) -> Result<T, String>,
    {
        if !self.is_success() {
            return self.into_failure();
        }
        let converted =
            serde_json::from_slice::<R>(&self.body).map_err(|err| err.to_string()).and_then(convert);
        match converted {
            Ok(data) => ApiResponse::success(self.status, data).with_raw(self.body),
            Err(reason) => {
                warn!(status = self.status, error = %reason, "response body did not match expected shape");
                ApiResponse::failure(
                    self.status,
                    Some(format!("unexpected response body: {reason}")),
                    Some(self.body),
                )
            }
        }
    }
}

/// Transport bound to one base URL and one API key.
#[derive(Clone)]
pub struct EndpointClient {
    http: HttpClient,
    base_url: Url,
    auth: ApiKeyAuth,
}

impl EndpointClient {
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` joined with `segments`, each percent-encoded.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Config(format!("base URL `{}` cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send through the retrying transport and read the full body.
    pub async fn execute<B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, ApiError> {
        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            let bytes = serde_json::to_vec(body)
                .map_err(|err| ApiError::Config(format!("failed to serialize request body: {err}")))?;
            builder = builder.body(bytes);
        }

        let response = self.http.send(builder, &self.auth, cancel).await?;
        let status = response.status().as_u16();

        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ApiError::Cancelled),
            bytes = response.bytes() => bytes.map_err(|err| classify_http_error(&err))?,
        };

        Ok(RawResponse { status, body: body.to_vec() })
    }
}

/// Client for the vector, index and embed services.
#[derive(Clone)]
pub struct VectorDbClient {
    config: Arc<ConnectorConfig>,
}

impl VectorDbClient {
    pub const fn new(config: Arc<ConnectorConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Build a transport for one endpoint. The version header and the key
    /// are attached as defaults; the auth injector re-applies them on every
    /// attempt.
    pub fn create_client(&self, credentials: &EndpointCredentials) -> Result<EndpointClient, ApiError> {
        let base_url = parse_base_url(&credentials.base_url)?;
        let auth = ApiKeyAuth::new(credentials.api_key.clone(), self.config.api_version.clone());

        let mut headers = HeaderMap::new();
        headers.insert(api_version_header_name(), auth.version_header()?);
        if auth.has_key() {
            headers.insert(api_key_header_name(), auth.key_header()?);
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(self.config.http.timeout_secs))
            .retry(RetryPolicy::from_config(&self.config.http.retry))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(EndpointClient { http, base_url, auth })
    }

    fn vector_client(&self) -> Result<EndpointClient, ApiError> {
        self.create_client(&self.config.action_processor.vector)
    }

    fn index_client(&self) -> Result<EndpointClient, ApiError> {
        self.create_client(&self.config.action_processor.index)
    }

    fn embed_client(&self) -> Result<EndpointClient, ApiError> {
        self.create_client(&self.config.action_processor.embed.credentials)
    }

    #[instrument(skip(self, vector, cancel), fields(id = %vector.id))]
    pub async fn upsert_vector(
        &self,
        vector: &VectorRecord,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<VectorRecord>, ApiError> {
        let client = self.vector_client()?;
        let url = client.url(&["vectors", "upsert"])?;
        let raw = client.execute(Method::POST, url, Some(&UpsertRequest::single(vector)), cancel).await?;
        log_outcome("upsert_vector", &raw);
        Ok(raw.into_echo(vector.clone()))
    }

    #[instrument(skip(self, index, cancel), fields(name = %index.name))]
    pub async fn create_index(
        &self,
        index: &IndexRecord,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<IndexRecord>, ApiError> {
        let client = self.index_client()?;
        let url = client.url(&["indexes"])?;
        let raw = client.execute(Method::POST, url, Some(&CreateIndexRequest::from(index)), cancel).await?;
        log_outcome("create_index", &raw);
        Ok(raw.into_echo(index.clone()))
    }

    #[instrument(skip(self, cancel))]
    pub async fn get_indexes(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<Vec<IndexRecord>>, ApiError> {
        let client = self.index_client()?;
        let url = client.url(&["indexes"])?;
        let raw = client.execute::<()>(Method::GET, url, None, cancel).await?;
        log_outcome("get_indexes", &raw);
        Ok(raw.into_converted(|list: IndexListResponse| {
            list.indexes.into_iter().map(IndexRecord::try_from).collect()
        }))
    }

    #[instrument(skip(self, cancel))]
    pub async fn delete_index(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<()>, ApiError> {
        let client = self.index_client()?;
        let url = client.url(&["indexes", name])?;
        let raw = client.execute::<()>(Method::DELETE, url, None, cancel).await?;
        log_outcome("delete_index", &raw);
        Ok(raw.into_empty())
    }

    #[instrument(skip(self, embed, cancel), fields(model = %embed.model, inputs = embed.inputs.len()))]
    pub async fn generate_embeddings(
        &self,
        embed: &EmbedRecord,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<EmbedRecord>, ApiError> {
        let client = self.embed_client()?;
        let url = client.url(&["embed"])?;
        let raw = client.execute(Method::POST, url, Some(&EmbedRequest::from(embed)), cancel).await?;
        log_outcome("generate_embeddings", &raw);
        Ok(raw.into_echo(embed.clone()))
    }

    /// `GET describe_index_stats` on the vector host.
    #[instrument(skip(self, cancel))]
    pub async fn test_connection(&self, cancel: &CancellationToken) -> Result<ApiResponse<()>, ApiError> {
        let client = self.vector_client()?;
        let url = client.url(&["describe_index_stats"])?;
        let raw = client.execute::<()>(Method::GET, url, None, cancel).await?;
        log_outcome("test_connection", &raw);
        Ok(raw.into_empty())
    }

    #[instrument(skip(self, cancel))]
    pub async fn list_vector_ids(
        &self,
        namespace: Option<&str>,
        limit: Option<u32>,
        pagination_token: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<VectorPage>, ApiError> {
        let client = self.vector_client()?;
        let mut url = client.url(&["vectors", "list"])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(namespace) = namespace {
                query.append_pair("namespace", namespace);
            }
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.to_string());
            }
            if let Some(token) = pagination_token {
                query.append_pair("paginationToken", token);
            }
        }
        strip_empty_query(&mut url);

        let raw = client.execute::<()>(Method::GET, url, None, cancel).await?;
        log_outcome("list_vector_ids", &raw);
        Ok(raw.into_decoded::<ListVectorsResponse>().map(VectorPage::from))
    }

    #[instrument(skip(self, ids, cancel), fields(count = ids.len()))]
    pub async fn fetch_vectors(
        &self,
        ids: &[String],
        namespace: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<Vec<VectorRecord>>, ApiError> {
        let client = self.vector_client()?;
        let mut url = client.url(&["vectors", "fetch"])?;
        {
            let mut query = url.query_pairs_mut();
            for id in ids {
                query.append_pair("ids", id);
            }
            if let Some(namespace) = namespace {
                query.append_pair("namespace", namespace);
            }
        }
        strip_empty_query(&mut url);

        let raw = client.execute::<()>(Method::GET, url, None, cancel).await?;
        log_outcome("fetch_vectors", &raw);
        Ok(raw.into_decoded::<FetchVectorsResponse>().map(|response| response.into_records(ids)))
    }
}

#[async_trait]
impl VectorDbGateway for VectorDbClient {
    async fn upsert_vector(
        &self,
        vector: &VectorRecord,
        cancel: &CancellationToken,
    ) -> pinesync_domain::Result<ApiResponse<VectorRecord>> {
        Self::upsert_vector(self, vector, cancel).await.map_err(ConnectorError::from)
    }

    async fn create_index(
        &self,
        index: &IndexRecord,
        cancel: &CancellationToken,
    ) -> pinesync_domain::Result<ApiResponse<IndexRecord>> {
        Self::create_index(self, index, cancel).await.map_err(ConnectorError::from)
    }

    async fn list_indexes(
        &self,
        cancel: &CancellationToken,
    ) -> pinesync_domain::Result<ApiResponse<Vec<IndexRecord>>> {
        self.get_indexes(cancel).await.map_err(ConnectorError::from)
    }

    async fn delete_index(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> pinesync_domain::Result<ApiResponse<()>> {
        Self::delete_index(self, name, cancel).await.map_err(ConnectorError::from)
    }

    async fn generate_embeddings(
        &self,
        embed: &EmbedRecord,
        cancel: &CancellationToken,
    ) -> pinesync_domain::Result<ApiResponse<EmbedRecord>> {
        Self::generate_embeddings(self, embed, cancel).await.map_err(ConnectorError::from)
    }

    async fn test_connection(
        &self,
        cancel: &CancellationToken,
    ) -> pinesync_domain::Result<ApiResponse<()>> {
        Self::test_connection(self, cancel).await.map_err(ConnectorError::from)
    }

    async fn list_vector_ids(
        &self,
        namespace: Option<&str>,
        limit: Option<u32>,
        pagination_token: Option<&str>,
        cancel: &CancellationToken,
    ) -> pinesync_domain::Result<ApiResponse<VectorPage>> {
        Self::list_vector_ids(self, namespace, limit, pagination_token, cancel)
            .await
            .map_err(ConnectorError::from)
    }

    async fn fetch_vectors(
        &self,
        ids: &[String],
        namespace: Option<&str>,
        cancel: &CancellationToken,
    ) -> pinesync_domain::Result<ApiResponse<Vec<VectorRecord>>> {
        Self::fetch_vectors(self, ids, namespace, cancel).await.map_err(ConnectorError::from)
    }
}

/// Index hosts are often configured without a scheme.
fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Config("base URL is not configured".to_string()));
    }
    let candidate =
        if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };
    Url::parse(&candidate).map_err(|err| ApiError::Config(format!("invalid base URL `{raw}`: {err}")))
}

fn strip_empty_query(url: &mut Url) {
    if url.query() == Some("") {
        url.set_query(None);
    }
}

fn log_outcome(operation: &'static str, raw: &RawResponse) {
    if raw.is_success() {
        debug!(operation, status = raw.status, "request succeeded");
    } else {
        warn!(operation, status = raw.status, body = %raw.text(), "request failed");
    }
}
