use std::collections::HashMap;

use docvec::core::{Document, DocvecError, VectorStore};
use docvec::embeddings::EmbeddingModelsConfig;
use docvec::qdrant::{QdrantDb, QdrantDbConfig};
use serde_json::json;
use tracing::Level;

#[tokio::main]
async fn main() -> Result<(), DocvecError> {
    let config = QdrantDbConfig::local(".qdrant/demo")
        .with_embedding(EmbeddingModelsConfig::fake(32))
        .with_collection("languages")
        .with_debug(true);

    tracing_subscriber::fmt()
        .with_max_level(if config.debug {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    let store = QdrantDb::new(config).await?;

    // --- Ingest ---
    println!("=== Ingesting Documents ===");
    let source = |s: &str| HashMap::from([("source".to_string(), json!(s))]);
    let docs = vec![
        Document::with_metadata(
            "Rust is a systems programming language focused on safety, speed, and concurrency.",
            source("rust-book"),
        ),
        Document::with_metadata(
            "Python is a high-level programming language known for its readability.",
            source("python-docs"),
        ),
        Document::with_metadata(
            "TypeScript is a typed superset of JavaScript that compiles to plain JavaScript.",
            source("ts-handbook"),
        ),
    ];
    let ids = store.add_documents(docs).await?;
    println!("Stored {} documents", ids.len());

    // --- Search ---
    println!("\n=== Similarity Search ===");
    let results = store
        .similar_texts_with_scores("memory safety without garbage collection", 2, None)
        .await?;
    for (i, (doc, score)) in results.iter().enumerate() {
        println!("  {i}: [{score:.3}] \"{}\"", doc.content);
    }

    // --- Filtered search ---
    println!("\n=== Filtered Search ===");
    let filter = r#"{"must": [{"key": "metadata.source", "match": {"value": "python-docs"}}]}"#;
    let results = store
        .similar_texts_with_scores("programming language", 3, Some(filter))
        .await?;
    for (doc, score) in &results {
        println!("  [{score:.3}] \"{}\"", doc.content);
    }

    // --- Cleanup ---
    store.delete_collection("languages").await?;
    println!("\nDeleted collection; {} left", store.list_collections().await?.len());
    Ok(())
}
