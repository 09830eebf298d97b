//! CLI commands end-to-end: context wiring, handlers, pipeline and the
//! JSON-lines cache writer against a WireMock server.

use pinesync_app::{execute, AppContext, Command};
use pinesync_domain::{CloudProvider, ConnectorConfig, EndpointCredentials, MetricType};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context_for(server: &MockServer) -> AppContext {
    let mut config = ConnectorConfig::default();
    config.action_processor.vector = EndpointCredentials::new(server.uri(), "vector-key");
    config.action_processor.index = EndpointCredentials::new(server.uri(), "index-key");
    config.action_processor.embed.credentials = EndpointCredentials::new(server.uri(), "embed-key");
    config.cache_writer.index.upload_object = true;
    config.http.timeout_secs = 5;
    config.http.retry.delay_unit_ms = 1;
    AppContext::new(config)
}

#[tokio::test]
async fn create_index_command_sends_serverless_spec() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"indexes": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexes"))
        .and(header("api-key", "index-key"))
        .and(body_partial_json(json!({
            "name": "docs",
            "dimension": 8,
            "spec": {"serverless": {"cloud": "gcp", "region": "europe-west4"}}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "docs"})))
        .expect(1)
        .mount(&server)
        .await;

    let command = Command::CreateIndex {
        name: "docs".into(),
        dimension: 8,
        metric: MetricType::Cosine,
        cloud: CloudProvider::Gcp,
        region: "europe-west4".into(),
    };
    let report = execute(&context_for(&server), command, &CancellationToken::new()).await.unwrap();

    assert!(report.success);
    assert_eq!(report.command, "create_index");
    assert_eq!(report.result["outcome"], "succeeded");
    assert_eq!(report.result["output"]["name"], "docs");
}

#[tokio::test]
async fn test_connection_reports_unauthorized_without_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/describe_index_stats"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let report = execute(&context_for(&server), Command::TestConnection, &CancellationToken::new())
        .await
        .unwrap();

    assert!(!report.success);
    assert_eq!(report.result["status_code"], 401);
}

#[tokio::test]
async fn invalid_upsert_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    let command = Command::UpsertVector { id: String::new(), values: vec![0.1], namespace: None };
    let report = execute(&context_for(&server), command, &CancellationToken::new()).await.unwrap();

    assert!(!report.success);
    assert_eq!(report.result["outcome"], "failed");
    assert_eq!(report.result["code"], "400");
}

#[tokio::test]
async fn sync_command_appends_index_collection_to_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "indexes": [{"name": "docs", "dimension": 8, "metric": "cosine"}]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("cache.jsonl");
    let command = Command::Sync { namespace: None, page_limit: None, output: Some(output.clone()) };
    let report = execute(&context_for(&server), command, &CancellationToken::new()).await.unwrap();

    assert!(report.success);
    let contents = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<Value> = contents.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["kind"], "index");
    assert_eq!(lines[0]["changes"][0]["key"], "docs");
}

#[tokio::test]
async fn cancelled_sync_is_an_error() {
    let server = MockServer::start().await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let dir = tempfile::tempdir().unwrap();
    let command =
        Command::Sync { namespace: None, page_limit: None, output: Some(dir.path().join("c.jsonl")) };
    let err = execute(&context_for(&server), command, &cancel).await.unwrap_err();

    assert!(err.is_cancelled());
}
