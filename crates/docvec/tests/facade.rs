use docvec::core::{Document, VectorStore};
use docvec::embeddings::EmbeddingModelsConfig;
use docvec::qdrant::{QdrantDb, QdrantDbConfig};

#[tokio::test]
async fn facade_exposes_full_pipeline() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = QdrantDbConfig::local(dir.path().to_string_lossy())
        .with_embedding(EmbeddingModelsConfig::fake(8))
        .with_collection("facade");
    let store = QdrantDb::new(config).await.unwrap();

    store
        .add_documents(vec![Document::new("through the facade")])
        .await
        .unwrap();
    let hits = store.similar_texts("through the facade").await.unwrap();
    assert_eq!(hits[0].0.content, "through the facade");
}
