//! docvec: a document vector store over Qdrant.
//!
//! This crate re-exports the docvec sub-crates for single-import usage.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `default` | `embeddings`, `qdrant` |
//! | `embeddings` | Embedding provider lookup: Fake, OpenAI, Ollama |
//! | `qdrant` | `QdrantDb` with remote and local file-backed backends |
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use docvec::core::{Document, VectorStore};
//! use docvec::embeddings::EmbeddingModelsConfig;
//! use docvec::qdrant::{QdrantDb, QdrantDbConfig};
//! ```

/// Core traits and types: Document, Embeddings, VectorStore, DocvecError.
/// Always available.
pub use docvec_core as core;

/// Embedding providers and `create_embeddings`.
#[cfg(feature = "embeddings")]
pub use docvec_embeddings as embeddings;

/// Qdrant-backed `VectorStore`.
#[cfg(feature = "qdrant")]
pub use docvec_qdrant as qdrant;
