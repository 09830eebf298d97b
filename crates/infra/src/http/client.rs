use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::auth::RequestAuthenticator;
use crate::api::errors::ApiError;
use crate::errors::conversions::classify_http_error;
use crate::http::retry::{RetryDecision, RetryPolicy};

/// HTTP client with retry, per-attempt authentication and cancellation.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, ApiError> {
        Self::builder().build()
    }

    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request builder with retry semantics.
    ///
    /// Each attempt rebuilds the request and runs `auth` on it. Transient
    /// statuses that outlive the retry budget are returned as the final
    /// response so the caller can build a failure envelope from the body.
    pub async fn send(
        &self,
        builder: RequestBuilder,
        auth: &dyn RequestAuthenticator,
        cancel: &CancellationToken,
    ) -> Result<Response, ApiError> {
        let mut retries_done: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(ApiError::Cancelled);
            }

            let cloned_builder = builder.try_clone().ok_or_else(|| {
                ApiError::Config(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;
            let mut request = cloned_builder.build().map_err(|err| classify_http_error(&err))?;
            auth.authenticate(&mut request)?;

            let method = request.method().clone();
            let url = request.url().clone();
            let attempt = retries_done + 1;
            debug!(attempt, %method, %url, "sending HTTP request");

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ApiError::Cancelled),
                result = self.client.execute(request) => result,
            };

            let outcome = outcome.map_err(|err| classify_http_error(&err));
            let decision = match &outcome {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, %method, %url, %status, "received HTTP response");
                    let transient = !status.is_success()
                        && ApiError::from_status(status.as_u16(), String::new()).should_retry();
                    self.retry.decide(retries_done, transient)
                }
                Err(err) => {
                    debug!(attempt, %method, %url, error = %err, "HTTP request failed");
                    self.retry.decide(retries_done, err.should_retry())
                }
            };

            match decision {
                RetryDecision::RetryAfter(delay) => {
                    warn!(
                        attempt,
                        %method,
                        %url,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "transient failure, retrying"
                    );
                    sleep_or_cancel(delay, cancel).await?;
                    retries_done += 1;
                }
                RetryDecision::Stop => return outcome,
            }
        }
    }
}

async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> Result<(), ApiError> {
    if delay.is_zero() {
        return Ok(());
    }
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ApiError::Cancelled),
        () = tokio::time::sleep(delay) => Ok(()),
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    retry: RetryPolicy,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(pinesync_domain::constants::DEFAULT_HTTP_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub const fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, ApiError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout);

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| classify_http_error(&err))?;
        Ok(HttpClient { client, retry: self.retry })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use pinesync_domain::constants::API_KEY_HEADER;
    use reqwest::{Method, StatusCode};
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::auth::ApiKeyAuth;

    fn client_with_retries(max_retries: u32) -> HttpClient {
        HttpClient::builder()
            .retry(RetryPolicy::exponential(max_retries, 2, Duration::from_millis(1)))
            .build()
            .expect("http client")
    }

    fn auth() -> ApiKeyAuth {
        ApiKeyAuth::new("test-key", "2024-10")
    }

    #[tokio::test]
    async fn returns_successful_response_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_retries(3);
        let response = client
            .send(client.request(Method::GET, server.uri()), &auth(), &CancellationToken::new())
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn retries_rate_limit_three_times_then_succeeds() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();
        Mock::given(method("POST"))
            .and(header(API_KEY_HEADER, "test-key"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                let current = attempts_clone.fetch_add(1, Ordering::SeqCst);
                if current < 3 {
                    ResponseTemplate::new(429)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(4)
            .mount(&server)
            .await;

        let client = client_with_retries(3);
        let builder = client.request(Method::POST, server.uri()).body("{}");
        let response =
            client.send(builder, &auth(), &CancellationToken::new()).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 4);
        // auth header present on every attempt, not just the first
        assert!(requests.iter().all(|req| req.headers.get(API_KEY_HEADER).is_some()));
    }

    #[tokio::test]
    async fn returns_last_server_error_after_exhausting_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .expect(4)
            .mount(&server)
            .await;

        let client = client_with_retries(3);
        let response = client
            .send(client.request(Method::GET, server.uri()), &auth(), &CancellationToken::new())
            .await
            .expect("final response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.text().await.unwrap(), "unavailable");
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_retries(3);
        let response = client
            .send(client.request(Method::GET, server.uri()), &auth(), &CancellationToken::new())
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn auth_rejections_are_final() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_retries(3);
        let cancel = CancellationToken::new();
        let unauthorized =
            client.send(client.request(Method::GET, server.uri()), &auth(), &cancel).await.unwrap();
        let forbidden =
            client.send(client.request(Method::POST, server.uri()), &auth(), &cancel).await.unwrap();

        assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_with_retries(3);
        let err = client
            .send(
                client.request(Method::GET, server.uri()),
                &ApiKeyAuth::new("", "2024-10"),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Config(_)));
    }

    #[tokio::test]
    async fn retries_on_network_failure_then_reports_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED
        let url = format!("http://{addr}");

        let client = client_with_retries(1);
        let result =
            client.send(client.request(Method::GET, &url), &auth(), &CancellationToken::new()).await;

        match result {
            Err(err @ ApiError::Network(_)) => {
                assert!(err.should_retry());
            }
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancellation_interrupts_backoff() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = HttpClient::builder()
            .retry(RetryPolicy::exponential(3, 2, Duration::from_secs(30)))
            .build()
            .expect("http client");
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = client
            .send(client.request(Method::GET, server.uri()), &auth(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Cancelled));
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn already_cancelled_token_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_with_retries(3);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = client
            .send(client.request(Method::GET, server.uri()), &auth(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
    }
}
