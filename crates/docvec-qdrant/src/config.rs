use docvec_embeddings::EmbeddingModelsConfig;
use qdrant_client::qdrant::Distance;
use serde::{Deserialize, Serialize};

/// Distance metric a collection is created with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclid,
    Dot,
    Manhattan,
}

impl DistanceMetric {
    /// Whether a larger score means a closer match.
    pub fn higher_is_better(self) -> bool {
        matches!(self, DistanceMetric::Cosine | DistanceMetric::Dot)
    }
}

impl From<DistanceMetric> for Distance {
    fn from(metric: DistanceMetric) -> Self {
        match metric {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Euclid => Distance::Euclid,
            DistanceMetric::Dot => Distance::Dot,
            DistanceMetric::Manhattan => Distance::Manhattan,
        }
    }
}

/// Configuration for [`QdrantDb`](crate::QdrantDb).
///
/// Every field has a default, so a partial document deserializes. Secrets are
/// never part of the config: the API key is read from the environment
/// variable named by `api_key_env` when the store is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QdrantDbConfig {
    /// Talk to a Qdrant server at `url`. When false, store data under `storage_path`.
    pub cloud: bool,
    /// Qdrant gRPC URL (e.g. `http://localhost:6334`).
    pub url: String,
    /// Environment variable holding the Qdrant API key.
    pub api_key_env: String,
    /// Directory for the local file-backed store.
    pub storage_path: String,
    /// Collection to (re)create when the store is opened. `None` defers the
    /// choice to [`set_collection`](docvec_core::VectorStore::set_collection).
    pub collection_name: Option<String>,
    pub embedding: EmbeddingModelsConfig,
    pub distance: DistanceMetric,
    /// Per-request timeout of the remote client, in seconds.
    pub timeout_secs: u64,
    /// Size of the HNSW candidate list used during search.
    pub hnsw_ef: u64,
    /// Unused; kept so older configs still deserialize.
    pub host: String,
    /// Unused; kept so older configs still deserialize.
    pub port: u16,
    /// Log collection details and search matches at info level.
    pub debug: bool,
}

impl Default for QdrantDbConfig {
    fn default() -> Self {
        Self {
            cloud: true,
            url: "http://localhost:6334".to_string(),
            api_key_env: "QDRANT_API_KEY".to_string(),
            storage_path: ".qdrant/data".to_string(),
            collection_name: None,
            embedding: EmbeddingModelsConfig::default(),
            distance: DistanceMetric::Cosine,
            timeout_secs: 60,
            hnsw_ef: 128,
            host: "127.0.0.1".to_string(),
            port: 6333,
            debug: false,
        }
    }
}

impl QdrantDbConfig {
    /// Config for a remote Qdrant server.
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            cloud: true,
            url: url.into(),
            ..Self::default()
        }
    }

    /// Config for the local file-backed store rooted at `storage_path`.
    pub fn local(storage_path: impl Into<String>) -> Self {
        Self {
            cloud: false,
            storage_path: storage_path.into(),
            ..Self::default()
        }
    }

    pub fn with_collection(mut self, name: impl Into<String>) -> Self {
        self.collection_name = Some(name.into());
        self
    }

    pub fn with_embedding(mut self, embedding: EmbeddingModelsConfig) -> Self {
        self.embedding = embedding;
        self
    }

    /// Set the distance metric (default: Cosine).
    pub fn with_distance(mut self, distance: DistanceMetric) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_api_key_env(mut self, api_key_env: impl Into<String>) -> Self {
        self.api_key_env = api_key_env.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_hnsw_ef(mut self, hnsw_ef: u64) -> Self {
        self.hnsw_ef = hnsw_ef;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
