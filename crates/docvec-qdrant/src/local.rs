use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use docvec_core::DocvecError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::backend::{
    CollectionInfo, CollectionStatus, Point, QdrantBackend, ScoredPayload, SearchRequest,
};
use crate::config::DistanceMetric;

const FILE_EXTENSION: &str = "json";

/// One collection as persisted on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCollection {
    vector_size: u64,
    distance: DistanceMetric,
    points: BTreeMap<String, StoredPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredPoint {
    vector: Vec<f32>,
    payload: Map<String, Value>,
}

/// A [`QdrantBackend`] that keeps collections in files under a directory.
///
/// Each collection lives in `<root>/<name>.json` and is rewritten on every
/// mutation, so reopening the same directory restores all data. Search is an
/// exact scan; `hnsw_ef` and `exact` in a [`SearchRequest`] are ignored.
pub struct LocalBackend {
    root: PathBuf,
    collections: RwLock<BTreeMap<String, StoredCollection>>,
}

impl LocalBackend {
    /// Open (creating if needed) the store at `root` and load its collections.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, DocvecError> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| io_err(&root, e))?;

        let mut collections = BTreeMap::new();
        let mut entries = tokio::fs::read_dir(&root)
            .await
            .map_err(|e| io_err(&root, e))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_err(&root, e))? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let bytes = tokio::fs::read(&path).await.map_err(|e| io_err(&path, e))?;
            let stored: StoredCollection = serde_json::from_slice(&bytes).map_err(|e| {
                DocvecError::VectorStore(format!("corrupt collection file {}: {e}", path.display()))
            })?;
            collections.insert(name.to_string(), stored);
        }
        debug!(path = %root.display(), collections = collections.len(), "opened local store");

        Ok(Self {
            root,
            collections: RwLock::new(collections),
        })
    }

    /// Directory holding the collection files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{FILE_EXTENSION}"))
    }

    /// Write `collection` to a temp file, then rename it over the real one.
    async fn persist(&self, name: &str, collection: &StoredCollection) -> Result<(), DocvecError> {
        let path = self.collection_path(name);
        let tmp = self.root.join(format!("{name}.{FILE_EXTENSION}.tmp"));
        let bytes = serde_json::to_vec(collection).map_err(|e| {
            DocvecError::VectorStore(format!("failed to serialize collection '{name}': {e}"))
        })?;
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| io_err(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_err(&path, e))
    }
}

fn io_err(path: &Path, e: std::io::Error) -> DocvecError {
    DocvecError::VectorStore(format!("{}: {e}", path.display()))
}

fn not_found(name: &str) -> DocvecError {
    DocvecError::VectorStore(format!("collection '{name}' not found"))
}

/// Collection names become file names, so they must be a single path component.
fn validate_name(name: &str) -> Result<(), DocvecError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.ends_with(".tmp")
    {
        return Err(DocvecError::Validation(format!(
            "invalid collection name {name:?}"
        )));
    }
    Ok(())
}

#[async_trait]
impl QdrantBackend for LocalBackend {
    async fn list_collections(&self) -> Result<Vec<String>, DocvecError> {
        Ok(self.collections.read().await.keys().cloned().collect())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, DocvecError> {
        Ok(self.collections.read().await.contains_key(name))
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionInfo, DocvecError> {
        let collections = self.collections.read().await;
        let collection = collections.get(name).ok_or_else(|| not_found(name))?;
        Ok(CollectionInfo {
            name: name.to_string(),
            status: CollectionStatus::Green,
            points_count: Some(collection.points.len() as u64),
        })
    }

    async fn recreate_collection(
        &self,
        name: &str,
        vector_size: u64,
        distance: DistanceMetric,
    ) -> Result<(), DocvecError> {
        validate_name(name)?;
        let collection = StoredCollection {
            vector_size,
            distance,
            points: BTreeMap::new(),
        };
        let mut collections = self.collections.write().await;
        self.persist(name, &collection).await?;
        collections.insert(name.to_string(), collection);
        debug!(collection = name, vector_size, "created local collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), DocvecError> {
        let mut collections = self.collections.write().await;
        if !collections.contains_key(name) {
            return Ok(());
        }
        // The file goes first; on failure the collection stays listed.
        let path = self.collection_path(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(&path, e)),
        }
        collections.remove(name);
        debug!(collection = name, "deleted local collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<Point>) -> Result<(), DocvecError> {
        let mut collections = self.collections.write().await;
        let stored = collections
            .get(collection)
            .ok_or_else(|| not_found(collection))?;

        // Validate the whole batch before touching anything.
        if let Some(bad) = points
            .iter()
            .find(|p| p.vector.len() as u64 != stored.vector_size)
        {
            return Err(DocvecError::VectorStore(format!(
                "wrong vector dimension for point {}: expected {}, got {}",
                bad.id,
                stored.vector_size,
                bad.vector.len()
            )));
        }

        let mut updated = stored.clone();
        let count = points.len();
        for point in points {
            updated.points.insert(
                point.id,
                StoredPoint {
                    vector: point.vector,
                    payload: point.payload,
                },
            );
        }
        self.persist(collection, &updated).await?;
        collections.insert(collection.to_string(), updated);
        debug!(collection, count, "upserted points to local collection");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        request: SearchRequest,
    ) -> Result<Vec<ScoredPayload>, DocvecError> {
        let collections = self.collections.read().await;
        let stored = collections
            .get(collection)
            .ok_or_else(|| not_found(collection))?;
        if request.vector.len() as u64 != stored.vector_size {
            return Err(DocvecError::VectorStore(format!(
                "wrong query dimension: expected {}, got {}",
                stored.vector_size,
                request.vector.len()
            )));
        }

        let distance = stored.distance;
        let mut hits: Vec<ScoredPayload> = stored
            .points
            .iter()
            .filter(|(_, p)| {
                request
                    .filter
                    .as_ref()
                    .is_none_or(|f| f.matches(&p.payload))
            })
            .map(|(id, p)| ScoredPayload {
                id: id.clone(),
                score: score(distance, &request.vector, &p.vector),
                payload: p.payload.clone(),
            })
            .collect();

        // Stable sort keeps ties in ascending id order.
        if distance.higher_is_better() {
            hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        } else {
            hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        }
        hits.truncate(request.limit as usize);
        Ok(hits)
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn score(distance: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
    match distance {
        DistanceMetric::Cosine => cosine_similarity(a, b),
        DistanceMetric::Dot => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        DistanceMetric::Euclid => a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt(),
        DistanceMetric::Manhattan => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_similarity_identical_vectors() {
        let v = vec![1.0_f32, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_orthogonal_vectors() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn distance_scores() {
        let a = [1.0_f32, 2.0];
        let b = [4.0_f32, 6.0];
        assert_eq!(score(DistanceMetric::Dot, &a, &b), 16.0);
        assert_eq!(score(DistanceMetric::Euclid, &a, &b), 5.0);
        assert_eq!(score(DistanceMetric::Manhattan, &a, &b), 7.0);
    }

    #[test]
    fn rejects_path_like_names() {
        assert!(validate_name("docs").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("x.tmp").is_err());
    }
}
