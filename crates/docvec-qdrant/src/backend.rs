use async_trait::async_trait;
use docvec_core::DocvecError;
use serde_json::{Map, Value};

use crate::config::DistanceMetric;
use crate::filter::PayloadFilter;

/// Health of a collection as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Fully optimized and ready.
    Green,
    /// Optimizing in the background.
    Yellow,
    /// Failed; needs attention.
    Red,
    /// Optimizations pending.
    Grey,
    Unknown,
}

/// Summary of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    pub name: String,
    pub status: CollectionStatus,
    /// `None` when the server did not report a count.
    pub points_count: Option<u64>,
}

/// A vector and its payload, keyed by a UUID string.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Map<String, Value>,
}

/// Parameters of one nearest-neighbor query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub vector: Vec<f32>,
    pub limit: u64,
    pub filter: Option<PayloadFilter>,
    pub hnsw_ef: u64,
    /// Force an exhaustive scan instead of the approximate index.
    pub exact: bool,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPayload {
    pub id: String,
    pub score: f32,
    pub payload: Map<String, Value>,
}

/// The calls [`QdrantDb`](crate::QdrantDb) needs from a vector database.
///
/// Implemented by [`RemoteBackend`](crate::RemoteBackend) for a Qdrant server
/// and by [`LocalBackend`](crate::LocalBackend) for on-disk storage.
#[async_trait]
pub trait QdrantBackend: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<String>, DocvecError>;

    async fn collection_exists(&self, name: &str) -> Result<bool, DocvecError> {
        Ok(self.list_collections().await?.iter().any(|c| c == name))
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionInfo, DocvecError>;

    /// Drop `name` if present, then create it empty.
    async fn recreate_collection(
        &self,
        name: &str,
        vector_size: u64,
        distance: DistanceMetric,
    ) -> Result<(), DocvecError>;

    async fn delete_collection(&self, name: &str) -> Result<(), DocvecError>;

    /// Insert or overwrite points by id, as one batch.
    async fn upsert(&self, collection: &str, points: Vec<Point>) -> Result<(), DocvecError>;

    /// Best matches first.
    async fn search(
        &self,
        collection: &str,
        request: SearchRequest,
    ) -> Result<Vec<ScoredPayload>, DocvecError>;
}
