use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Unified error type for docvec with variants covering all subsystems.
#[derive(Debug, Error)]
pub enum DocvecError {
    #[error("config error: {0}")]
    Config(String),
    #[error("embedding error: {0}")]
    Embedding(String),
    #[error("vector store error: {0}")]
    VectorStore(String),
    /// The backend reported a state that must never follow a successful call,
    /// such as a freshly created collection that is not empty.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("parsing error: {0}")]
    Parsing(String),
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A piece of text plus arbitrary metadata.
///
/// This is also the stored payload schema: a point's payload is exactly the
/// serialized `Document`, and unknown fields are rejected when reading it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    pub content: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(content: impl Into<String>, metadata: HashMap<String, Value>) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Deterministic identifier derived from the content alone.
    ///
    /// Two documents with the same content share an id, so re-ingesting them
    /// overwrites the stored point instead of adding a duplicate.
    pub fn id(&self) -> String {
        content_hash_id(&self.content)
    }

    /// Serialize into the JSON object stored as a point payload.
    pub fn to_payload(&self) -> Result<serde_json::Map<String, Value>, DocvecError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(DocvecError::Parsing(format!(
                "document serialized to non-object payload: {other}"
            ))),
            Err(e) => Err(DocvecError::Parsing(format!(
                "failed to serialize document: {e}"
            ))),
        }
    }

    /// Rebuild a document from a stored payload, failing on any shape mismatch.
    pub fn from_payload(payload: serde_json::Map<String, Value>) -> Result<Self, DocvecError> {
        serde_json::from_value(Value::Object(payload))
            .map_err(|e| DocvecError::Parsing(format!("payload is not a document: {e}")))
    }
}

/// UUIDv5 of `content`, rendered in hyphenated form.
pub fn content_hash_id(content: &str) -> String {
    uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, content.as_bytes()).to_string()
}

// ---------------------------------------------------------------------------
// Embeddings trait (implemented in docvec-embeddings)
// ---------------------------------------------------------------------------

/// Trait for embedding text into fixed-length vectors.
#[async_trait]
pub trait Embeddings: Send + Sync {
    /// Embed multiple texts (for batch document embedding).
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, DocvecError>;

    /// Embed a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, DocvecError>;

    /// Length of every vector this provider returns.
    fn dimensions(&self) -> usize;
}

// ---------------------------------------------------------------------------
// VectorStore trait (implemented in docvec-qdrant)
// ---------------------------------------------------------------------------

/// A document store with named collections and similarity search.
///
/// Operations on documents act on the *active* collection, chosen with
/// [`set_collection`](VectorStore::set_collection) or
/// [`create_collection`](VectorStore::create_collection).
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Name of the active collection, if one has been chosen.
    fn collection_name(&self) -> Option<&str>;

    /// Names of all collections currently in the store.
    async fn list_collections(&self) -> Result<Vec<String>, DocvecError>;

    /// Drop any collection called `name`, recreate it empty and make it active.
    async fn create_collection(&mut self, name: &str) -> Result<(), DocvecError>;

    /// Make `name` active, creating it only if it does not exist yet.
    async fn set_collection(&mut self, name: &str) -> Result<(), DocvecError>;

    /// Remove a collection unconditionally.
    async fn delete_collection(&self, name: &str) -> Result<(), DocvecError>;

    /// Delete every collection holding zero points. Returns how many were deleted.
    async fn clear_empty_collections(&self) -> Result<usize, DocvecError>;

    /// Embed and upsert documents into the active collection, returning their ids.
    async fn add_documents(&self, docs: Vec<Document>) -> Result<Vec<String>, DocvecError>;

    /// Up to `k` documents most similar to `text`, best first, with scores.
    ///
    /// `filter` is an optional JSON filter expression understood by the backend.
    async fn similar_texts_with_scores(
        &self,
        text: &str,
        k: usize,
        filter: Option<&str>,
    ) -> Result<Vec<(Document, f32)>, DocvecError>;

    /// The single best match for `text`, unfiltered.
    async fn similar_texts(&self, text: &str) -> Result<Vec<(Document, f32)>, DocvecError> {
        self.similar_texts_with_scores(text, 1, None).await
    }
}
