use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use docvec_core::{Document, DocvecError, Embeddings, VectorStore};
use docvec_embeddings::create_embeddings;
use tracing::{debug, error, info, warn};

use crate::backend::{CollectionInfo, CollectionStatus, Point, QdrantBackend, SearchRequest};
use crate::config::QdrantDbConfig;
use crate::filter::PayloadFilter;
use crate::local::LocalBackend;
use crate::remote::RemoteBackend;

/// A [`VectorStore`] over Qdrant, remote or local file-backed.
///
/// Each document is stored as one point:
/// - **id**: [`Document::id`], a hash of the content
/// - **vector**: the embedding of the content
/// - **payload**: the serialized [`Document`]
pub struct QdrantDb {
    config: QdrantDbConfig,
    embeddings: Arc<dyn Embeddings>,
    backend: Arc<dyn QdrantBackend>,
}

impl QdrantDb {
    /// Resolve the embedding provider, open the backend and, if the config
    /// names a collection, recreate it empty.
    pub async fn new(mut config: QdrantDbConfig) -> Result<Self, DocvecError> {
        dotenvy::dotenv().ok();
        let embeddings = create_embeddings(&config.embedding)?;

        let backend: Arc<dyn QdrantBackend> = if config.cloud {
            let api_key = std::env::var(&config.api_key_env).ok();
            if api_key.is_none() {
                debug!(env = %config.api_key_env, "no Qdrant API key in environment");
            }
            Arc::new(RemoteBackend::connect(
                &config.url,
                api_key,
                Duration::from_secs(config.timeout_secs),
            )?)
        } else {
            Arc::new(LocalBackend::open(&config.storage_path).await?)
        };

        let collection = config.collection_name.take();
        let mut db = Self::from_parts(config, embeddings, backend);
        if let Some(name) = collection {
            db.create_collection(&name).await?;
        }
        Ok(db)
    }

    /// Assemble a store from an existing provider and backend.
    ///
    /// `config.collection_name` becomes the active collection as-is; nothing
    /// is created.
    pub fn from_parts(
        config: QdrantDbConfig,
        embeddings: Arc<dyn Embeddings>,
        backend: Arc<dyn QdrantBackend>,
    ) -> Self {
        Self {
            config,
            embeddings,
            backend,
        }
    }

    pub fn config(&self) -> &QdrantDbConfig {
        &self.config
    }

    /// Dimensionality of the embedding provider, and so of every collection.
    pub fn embedding_dim(&self) -> usize {
        self.embeddings.dimensions()
    }

    pub fn backend(&self) -> &Arc<dyn QdrantBackend> {
        &self.backend
    }

    pub async fn collection_info(&self, name: &str) -> Result<CollectionInfo, DocvecError> {
        self.backend.collection_info(name).await
    }

    fn active_collection(&self, action: &str) -> Result<&str, DocvecError> {
        self.config
            .collection_name
            .as_deref()
            .ok_or_else(|| DocvecError::Config(format!("no collection set, cannot {action}")))
    }

    fn check_dims(&self, vectors: &[Vec<f32>]) -> Result<(), DocvecError> {
        let expected = self.embedding_dim();
        match vectors.iter().find(|v| v.len() != expected) {
            Some(v) => Err(DocvecError::Embedding(format!(
                "embedding has {} dimensions, expected {expected}",
                v.len()
            ))),
            None => Ok(()),
        }
    }

    fn log_matches(&self, text: &str, pairs: &[(Document, f32)]) {
        let max_score = pairs
            .iter()
            .map(|(_, s)| *s)
            .fold(f32::NEG_INFINITY, f32::max);
        if self.config.debug {
            info!(query = text, matches = pairs.len(), max_score, "found matches");
            for (doc, score) in pairs {
                info!(score, content = %doc.content, "match");
            }
        } else {
            debug!(query = text, matches = pairs.len(), max_score, "found matches");
        }
    }
}

#[async_trait]
impl VectorStore for QdrantDb {
    fn collection_name(&self) -> Option<&str> {
        self.config.collection_name.as_deref()
    }

    async fn list_collections(&self) -> Result<Vec<String>, DocvecError> {
        self.backend.list_collections().await
    }

    async fn create_collection(&mut self, name: &str) -> Result<(), DocvecError> {
        self.config.collection_name = Some(name.to_string());
        self.backend
            .recreate_collection(name, self.embedding_dim() as u64, self.config.distance)
            .await?;

        let info = self.backend.collection_info(name).await?;
        let has_points = info.points_count.is_some_and(|n| n != 0);
        if info.status != CollectionStatus::Green || has_points {
            error!(
                collection = name,
                status = ?info.status,
                points = ?info.points_count,
                "collection not clean after creation"
            );
            return Err(DocvecError::InvariantViolation(format!(
                "collection '{name}' is {:?} with {:?} points right after creation",
                info.status, info.points_count
            )));
        }

        if self.config.debug {
            info!(collection = name, ?info, "created collection");
        } else {
            debug!(collection = name, ?info, "created collection");
        }
        Ok(())
    }

    async fn set_collection(&mut self, name: &str) -> Result<(), DocvecError> {
        self.config.collection_name = Some(name.to_string());
        if !self.backend.collection_exists(name).await? {
            self.create_collection(name).await?;
        }
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), DocvecError> {
        self.backend.delete_collection(name).await
    }

    async fn clear_empty_collections(&self) -> Result<usize, DocvecError> {
        let mut deleted = 0;
        for name in self.backend.list_collections().await? {
            let info = self.backend.collection_info(&name).await?;
            match info.points_count {
                Some(0) => {
                    self.backend.delete_collection(&name).await?;
                    deleted += 1;
                }
                Some(_) => {}
                None => warn!(collection = %name, "point count unknown, keeping collection"),
            }
        }
        debug!(deleted, "cleared empty collections");
        Ok(deleted)
    }

    async fn add_documents(&self, docs: Vec<Document>) -> Result<Vec<String>, DocvecError> {
        let collection = self.active_collection("ingest docs")?;
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = docs.iter().map(|d| d.content.as_str()).collect();
        let vectors = self.embeddings.embed_documents(&texts).await?;
        if vectors.len() != docs.len() {
            return Err(DocvecError::Embedding(format!(
                "expected {} embeddings, got {}",
                docs.len(),
                vectors.len()
            )));
        }
        self.check_dims(&vectors)?;

        let mut ids = Vec::with_capacity(docs.len());
        let mut points = Vec::with_capacity(docs.len());
        for (doc, vector) in docs.iter().zip(vectors) {
            let id = doc.id();
            points.push(Point {
                id: id.clone(),
                vector,
                payload: doc.to_payload()?,
            });
            ids.push(id);
        }

        self.backend.upsert(collection, points).await?;
        debug!(collection, count = ids.len(), "ingested documents");
        Ok(ids)
    }

    async fn similar_texts_with_scores(
        &self,
        text: &str,
        k: usize,
        filter: Option<&str>,
    ) -> Result<Vec<(Document, f32)>, DocvecError> {
        let collection = self.active_collection("search")?;
        if k == 0 {
            return Ok(Vec::new());
        }
        let filter = filter
            .map(PayloadFilter::parse)
            .transpose()?
            .filter(|f| !f.is_empty());

        let vector = self.embeddings.embed_query(text).await?;
        self.check_dims(std::slice::from_ref(&vector))?;

        let hits = self
            .backend
            .search(
                collection,
                SearchRequest {
                    vector,
                    limit: k as u64,
                    filter,
                    hnsw_ef: self.config.hnsw_ef,
                    exact: false,
                },
            )
            .await?;

        let pairs = hits
            .into_iter()
            .map(|hit| Ok((Document::from_payload(hit.payload)?, hit.score)))
            .collect::<Result<Vec<_>, DocvecError>>()?;

        if pairs.is_empty() {
            warn!(collection, query = text, "no matches found");
            return Ok(pairs);
        }
        self.log_matches(text, &pairs);
        Ok(pairs)
    }
}
