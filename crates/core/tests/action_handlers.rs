//! Action handlers driven through an in-memory gateway.

mod support;

use std::sync::Arc;

use pinesync_core::actions::{CreateEmbedInput, CreateIndexInput, DeleteIndexInput};
use pinesync_core::{
    ActionHandler, ConnectionTestHandler, CreateEmbedHandler, CreateIndexHandler,
    DeleteIndexHandler, UpsertVectorHandler,
};
use pinesync_domain::{
    embed_batch_id, ConnectorError, EmbedEndpointConfig, IndexRecord, MetricType, ObjectKind, SyncPayload,
    UpdateOperation, VectorRecord,
};
use support::gateway::FakeGateway;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Create index
// ============================================================================

#[tokio::test]
async fn create_index_success_emits_single_upsert_keyed_by_name() {
    let gateway = Arc::new(FakeGateway::new());
    let handler = CreateIndexHandler::new(gateway.clone());

    let outcome = handler
        .handle(CreateIndexInput::new("docs", 1536, MetricType::Cosine), &CancellationToken::new())
        .await
        .unwrap();

    let output = outcome.output().unwrap();
    assert_eq!(output.name, "docs");
    assert_eq!(output.host, "");

    let sync = outcome.sync().unwrap();
    assert_eq!(sync.kind, ObjectKind::Index);
    assert_eq!(sync.len(), 1);
    assert_eq!(sync.changes[0].operation, UpdateOperation::Upsert);
    assert_eq!(sync.changes[0].key, "docs");
    assert_eq!(sync.changes[0].field_names, vec!["Id".to_string()]);
    assert!(matches!(sync.changes[0].payload, Some(SyncPayload::Index(ref i)) if i.dimension == 1536));

    assert_eq!(gateway.calls(), ["list_indexes", "create_index"]);
}

#[tokio::test]
async fn create_index_conflict_returns_409_without_creating() {
    let gateway =
        Arc::new(FakeGateway::new().with_indexes(vec![IndexRecord::new("Docs", 8, MetricType::Cosine)]));
    let handler = CreateIndexHandler::new(gateway.clone());

    let outcome = handler
        .handle(CreateIndexInput::new("docs", 1536, MetricType::Cosine), &CancellationToken::new())
        .await
        .unwrap();

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.code, "409");
    assert_eq!(failure.errors[0].source, "CreateIndexHandler");
    assert!(failure.errors[0].text.contains("'docs' already exists"));
    assert!(outcome.sync().is_none());
    assert_eq!(gateway.calls(), ["list_indexes"]);
}

#[tokio::test]
async fn create_index_invalid_name_never_reaches_gateway() {
    let gateway = Arc::new(FakeGateway::new());
    let handler = CreateIndexHandler::new(gateway.clone());

    let outcome = handler
        .handle(CreateIndexInput::new("Not_Valid", 8, MetricType::Cosine), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.failure().unwrap().code, "400");
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn create_index_remote_rejection_preserves_status() {
    let gateway = Arc::new(FakeGateway::new().failing_with(403, "quota exceeded"));
    let handler = CreateIndexHandler::new(gateway);

    let outcome = handler
        .handle(CreateIndexInput::new("docs", 8, MetricType::Euclidean), &CancellationToken::new())
        .await
        .unwrap();

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.code, "403");
    assert_eq!(failure.errors[0].text, "quota exceeded");
}

#[tokio::test]
async fn create_index_transport_error_becomes_failure() {
    let gateway = Arc::new(FakeGateway::new().erroring(ConnectorError::Network("reset".into())));
    let handler = CreateIndexHandler::new(gateway);

    let outcome = handler
        .handle(CreateIndexInput::new("docs", 8, MetricType::Cosine), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.failure().unwrap().code, "500");
}

#[tokio::test]
async fn create_index_propagates_cancellation() {
    let gateway = Arc::new(FakeGateway::new().erroring(ConnectorError::Cancelled));
    let handler = CreateIndexHandler::new(gateway);

    let result = handler
        .handle(CreateIndexInput::new("docs", 8, MetricType::Cosine), &CancellationToken::new())
        .await;

    assert_eq!(result, Err(ConnectorError::Cancelled));
}

// ============================================================================
// Upsert vector
// ============================================================================

#[tokio::test]
async fn upsert_vector_success_reports_id_and_namespace() {
    let gateway = Arc::new(FakeGateway::new());
    let handler = UpsertVectorHandler::new(gateway);
    let vector = VectorRecord::new("vec-1", vec![0.1, 0.2, 0.3]).with_namespace("books");

    let outcome = handler.handle(vector, &CancellationToken::new()).await.unwrap();

    let output = outcome.output().unwrap();
    assert_eq!(output.id, "vec-1");
    assert_eq!(output.namespace.as_deref(), Some("books"));
    assert_eq!(outcome.sync().unwrap().keys().collect::<Vec<_>>(), ["vec-1"]);
}

#[tokio::test]
async fn upsert_vector_rejects_empty_values() {
    let gateway = Arc::new(FakeGateway::new());
    let handler = UpsertVectorHandler::new(gateway.clone());

    let outcome =
        handler.handle(VectorRecord::new("vec-1", vec![]), &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.failure().unwrap().code, "400");
    assert!(gateway.calls().is_empty());
}

// ============================================================================
// Generate embeddings
// ============================================================================

fn embed_config() -> EmbedEndpointConfig {
    EmbedEndpointConfig { max_batch_size: 2, ..EmbedEndpointConfig::default() }
}

#[tokio::test]
async fn create_embed_fills_default_model_and_decodes_body() {
    let gateway = Arc::new(
        FakeGateway::new().with_embed_body(r#"{"data":[{"values":[0.5,0.25]},{"values":[1.0,0.0]}]}"#),
    );
    let handler = CreateEmbedHandler::new(gateway, &embed_config());

    let outcome = handler
        .handle(CreateEmbedInput::from_texts(["hello", "world"]), &CancellationToken::new())
        .await
        .unwrap();

    let output = outcome.output().unwrap();
    assert_eq!(output.model, "multilingual-e5-large");
    assert_eq!(output.embeddings, vec![vec![0.5, 0.25], vec![1.0, 0.0]]);

    let sync = outcome.sync().unwrap();
    assert_eq!(sync.kind, ObjectKind::Embed);
    assert_eq!(sync.len(), 1);
    assert!(!sync.changes[0].key.is_empty());
}

#[tokio::test]
async fn create_embed_keys_match_reader_batch_ids() {
    let body = r#"{"data":[{"values":[0.5,0.25]},{"values":[1.0,0.0]}]}"#;
    let handler =
        CreateEmbedHandler::new(Arc::new(FakeGateway::new().with_embed_body(body)), &embed_config());
    let cancel = CancellationToken::new();

    let first = handler.handle(CreateEmbedInput::from_texts(["hello", "world"]), &cancel).await.unwrap();
    let second = handler.handle(CreateEmbedInput::from_texts(["hello", "world"]), &cancel).await.unwrap();

    let expected = embed_batch_id("multilingual-e5-large", ["hello", "world"]);
    assert_eq!(first.sync().unwrap().changes[0].key, expected);
    assert_eq!(second.sync().unwrap().changes[0].key, expected);
}

#[tokio::test]
async fn create_embed_remote_500_returns_status_and_no_collection() {
    let gateway = Arc::new(FakeGateway::new().failing_with(500, "internal"));
    let handler = CreateEmbedHandler::new(gateway, &embed_config());

    let outcome = handler
        .handle(CreateEmbedInput::from_texts(["hello"]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.failure().unwrap().code, "500");
    assert!(outcome.sync().is_none());
}

#[tokio::test]
async fn create_embed_enforces_batch_bounds() {
    let gateway = Arc::new(FakeGateway::new());
    let handler = CreateEmbedHandler::new(gateway.clone(), &embed_config());
    let cancel = CancellationToken::new();

    let empty = handler.handle(CreateEmbedInput::from_texts(Vec::<String>::new()), &cancel).await.unwrap();
    assert_eq!(empty.failure().unwrap().code, "400");

    let too_many = handler.handle(CreateEmbedInput::from_texts(["a", "b", "c"]), &cancel).await.unwrap();
    assert_eq!(too_many.failure().unwrap().code, "400");

    assert!(gateway.calls().is_empty());
}

// ============================================================================
// Delete index
// ============================================================================

#[tokio::test]
async fn delete_index_emits_delete_operation() {
    let gateway = Arc::new(FakeGateway::new());
    let handler = DeleteIndexHandler::new(gateway);

    let outcome = handler
        .handle(DeleteIndexInput { name: "docs".into() }, &CancellationToken::new())
        .await
        .unwrap();

    let sync = outcome.sync().unwrap();
    assert_eq!(sync.changes[0].operation, UpdateOperation::Delete);
    assert_eq!(sync.changes[0].key, "docs");
    assert!(sync.changes[0].payload.is_none());
}

// ============================================================================
// Connection test
// ============================================================================

#[tokio::test]
async fn connection_test_maps_status_codes() {
    let cancel = CancellationToken::new();
    let cases = [
        (401, false, "Invalid Credentials: Unauthorized"),
        (403, false, "Invalid Credentials: Forbidden"),
        (404, false, "Unknown Issue."),
    ];
    for (status, success, message) in cases {
        let handler = ConnectionTestHandler::new(Arc::new(FakeGateway::new().failing_with(status, "x")));
        let result = handler.test_connection(&cancel).await.unwrap();
        assert_eq!(result.success, success);
        assert_eq!(result.message, message);
        assert_eq!(result.status_code, status);
    }

    let ok = ConnectionTestHandler::new(Arc::new(FakeGateway::new()));
    assert!(ok.test_connection(&cancel).await.unwrap().success);
}

#[tokio::test]
async fn connection_test_transport_error_is_500() {
    let handler = ConnectionTestHandler::new(Arc::new(
        FakeGateway::new().erroring(ConnectorError::Network("refused".into())),
    ));
    let result = handler.test_connection(&CancellationToken::new()).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.status_code, 500);
}
