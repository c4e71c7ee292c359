use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use docvec_core::DocvecError;
use docvec_embeddings::{
    create_embeddings, EmbeddingModelsConfig, Embeddings, OllamaEmbeddings, OpenAiEmbeddings,
};
use serde_json::{json, Value};

/// Request bodies received by a mock provider.
type Received = Arc<Mutex<Vec<Value>>>;

/// Spawn a mock provider answering every POST to `path` with `status` and
/// `body`. Returns the base URL and the request bodies it has seen.
async fn spawn_provider(
    path: &'static str,
    status: StatusCode,
    body: Value,
) -> (String, Received) {
    let received: Received = Arc::default();
    let seen = received.clone();
    let app = Router::new().route(
        path,
        post(move |Json(request): Json<Value>| {
            let seen = seen.clone();
            let body = body.clone();
            async move {
                seen.lock().unwrap().push(request);
                (status, Json(body))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });
    (format!("http://{addr}"), received)
}

fn last_request(received: &Received) -> Value {
    received
        .lock()
        .unwrap()
        .last()
        .cloned()
        .expect("provider received no request")
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

#[test]
fn create_rejects_zero_dims() {
    let err = create_embeddings(&EmbeddingModelsConfig::fake(0)).err().unwrap();
    assert!(matches!(err, DocvecError::Config(_)));
}

#[test]
fn create_openai_without_key_is_config_error() {
    const UNSET: &str = "DOCVEC_TEST_KEY_THAT_IS_NEVER_SET";
    let config = EmbeddingModelsConfig::openai().with_api_key_env(UNSET);
    let err = create_embeddings(&config).err().unwrap();
    assert!(matches!(err, DocvecError::Config(msg) if msg.contains(UNSET)));
}

#[test]
fn create_ollama_uses_configured_dims() {
    let emb = create_embeddings(&EmbeddingModelsConfig::ollama("nomic-embed-text", 768)).unwrap();
    assert_eq!(emb.dimensions(), 768);
}

#[test]
fn openai_rejects_empty_key() {
    let err = OpenAiEmbeddings::new("", "text-embedding-ada-002", 1536)
        .err()
        .unwrap();
    assert!(matches!(err, DocvecError::Config(_)));
}

// ---------------------------------------------------------------------------
// OpenAI
// ---------------------------------------------------------------------------

#[tokio::test]
async fn openai_parses_embeddings_in_index_order() {
    let (url, received) = spawn_provider(
        "/embeddings",
        StatusCode::OK,
        json!({"data": [
            {"index": 1, "embedding": [0.0, 1.0]},
            {"index": 0, "embedding": [1.0, 0.0]}
        ]}),
    )
    .await;
    let emb = OpenAiEmbeddings::new("sk-test", "text-embedding-3-small", 2)
        .unwrap()
        .with_base_url(url);

    let vecs = emb.embed_documents(&["first", "second"]).await.unwrap();
    assert_eq!(vecs, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);

    let sent = last_request(&received);
    assert_eq!(sent["model"], "text-embedding-3-small");
    assert_eq!(sent["input"], json!(["first", "second"]));
}

#[tokio::test]
async fn openai_surfaces_api_error_message() {
    let (url, _received) = spawn_provider(
        "/embeddings",
        StatusCode::UNAUTHORIZED,
        json!({"error": {"message": "invalid api key"}}),
    )
    .await;
    let emb = OpenAiEmbeddings::new("sk-bad", "text-embedding-3-small", 2)
        .unwrap()
        .with_base_url(url);

    let err = emb.embed_query("hi").await.unwrap_err();
    assert!(matches!(err, DocvecError::Embedding(msg) if msg.contains("invalid api key")));
}

// ---------------------------------------------------------------------------
// Ollama
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ollama_parses_batch_embeddings() {
    let (url, received) = spawn_provider(
        "/api/embed",
        StatusCode::OK,
        json!({"embeddings": [[0.5, 0.5, 0.0], [0.0, 0.0, 1.0]]}),
    )
    .await;
    let emb = OllamaEmbeddings::new("nomic-embed-text", 3).with_base_url(url);

    let vecs = emb.embed_documents(&["a", "b"]).await.unwrap();
    assert_eq!(vecs, vec![vec![0.5, 0.5, 0.0], vec![0.0, 0.0, 1.0]]);

    let sent = last_request(&received);
    assert_eq!(sent["model"], "nomic-embed-text");
    assert_eq!(sent["input"], json!(["a", "b"]));
}

#[tokio::test]
async fn ollama_server_error_is_embedding_error() {
    let (url, _received) = spawn_provider(
        "/api/embed",
        StatusCode::NOT_FOUND,
        json!({"error": "model 'missing' not found"}),
    )
    .await;
    let emb = OllamaEmbeddings::new("missing", 3).with_base_url(url);

    let err = emb.embed_query("a").await.unwrap_err();
    assert!(matches!(err, DocvecError::Embedding(msg) if msg.contains("not found")));
}

#[tokio::test]
async fn ollama_missing_field_is_embedding_error() {
    let (url, _received) =
        spawn_provider("/api/embed", StatusCode::OK, json!({"unexpected": true})).await;
    let emb = OllamaEmbeddings::new("nomic-embed-text", 3).with_base_url(url);

    let err = emb.embed_query("a").await.unwrap_err();
    assert!(matches!(err, DocvecError::Embedding(_)));
}

#[tokio::test]
async fn ollama_non_numeric_value_is_embedding_error() {
    let (url, _received) = spawn_provider(
        "/api/embed",
        StatusCode::OK,
        json!({"embeddings": [[0.1, "oops", 0.3]]}),
    )
    .await;
    let emb = OllamaEmbeddings::new("nomic-embed-text", 3).with_base_url(url);

    let err = emb.embed_query("a").await.unwrap_err();
    assert!(matches!(err, DocvecError::Embedding(msg) if msg.contains("row 0")));
}

#[tokio::test]
async fn ollama_non_array_row_is_embedding_error() {
    let (url, _received) = spawn_provider(
        "/api/embed",
        StatusCode::OK,
        json!({"embeddings": [[1.0, 0.0, 0.0], {"vector": [0.0]}]}),
    )
    .await;
    let emb = OllamaEmbeddings::new("nomic-embed-text", 3).with_base_url(url);

    let err = emb.embed_documents(&["a", "b"]).await.unwrap_err();
    assert!(matches!(err, DocvecError::Embedding(msg) if msg.contains("row 1")));
}

#[tokio::test]
async fn empty_batches_make_no_request() {
    let emb = OllamaEmbeddings::new("nomic-embed-text", 3).with_base_url("http://127.0.0.1:9");
    assert!(emb.embed_documents(&[]).await.unwrap().is_empty());
}
