//! Qdrant vector store integration for docvec.
//!
//! This crate provides [`QdrantDb`], an implementation of the
//! [`VectorStore`](docvec_core::VectorStore) trait backed by
//! [Qdrant](https://qdrant.tech/). It talks to a Qdrant server through
//! [`RemoteBackend`], or keeps collections on local disk through
//! [`LocalBackend`].
//!
//! # Example
//!
//! ```rust,no_run
//! use docvec_core::{Document, VectorStore};
//! use docvec_embeddings::EmbeddingModelsConfig;
//! use docvec_qdrant::{QdrantDb, QdrantDbConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = QdrantDbConfig::local(".qdrant/data")
//!     .with_embedding(EmbeddingModelsConfig::fake(64))
//!     .with_collection("docs");
//! let store = QdrantDb::new(config).await?;
//! store.add_documents(vec![Document::new("hello")]).await?;
//! let hits = store.similar_texts_with_scores("hello", 1, None).await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod config;
mod filter;
mod local;
mod remote;
mod vector_store;

pub use backend::{
    CollectionInfo, CollectionStatus, Point, QdrantBackend, ScoredPayload, SearchRequest,
};
pub use config::{DistanceMetric, QdrantDbConfig};
pub use filter::{FieldCondition, MatchSpec, MatchValue, PayloadFilter};
pub use local::LocalBackend;
pub use remote::RemoteBackend;
pub use vector_store::QdrantDb;

// Re-export core traits for convenience.
pub use docvec_core::{Document, Embeddings, VectorStore};
