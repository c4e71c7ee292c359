//! Embedding providers for docvec.
//!
//! [`create_embeddings`] resolves an [`EmbeddingModelsConfig`] into a shared
//! [`Embeddings`] handle. The handle reports its output dimensionality through
//! [`Embeddings::dimensions`], which collections are sized from.

mod config;
mod fake;
mod ollama;
mod openai;

pub use config::{create_embeddings, EmbeddingModelType, EmbeddingModelsConfig};
pub use fake::FakeEmbeddings;
pub use ollama::OllamaEmbeddings;
pub use openai::OpenAiEmbeddings;

// Re-export the Embeddings trait from core (forward-declared there).
pub use docvec_core::Embeddings;
