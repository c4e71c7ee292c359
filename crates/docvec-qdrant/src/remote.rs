use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use docvec_core::DocvecError;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{
    value::Kind, CollectionStatus as QdrantCollectionStatus, CreateCollectionBuilder, Distance,
    PointId, PointStruct, ScoredPoint, SearchParamsBuilder, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Qdrant, QdrantError};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::backend::{
    CollectionInfo, CollectionStatus, Point, QdrantBackend, ScoredPayload, SearchRequest,
};
use crate::config::DistanceMetric;

// ---------------------------------------------------------------------------
// RemoteBackend
// ---------------------------------------------------------------------------

/// A [`QdrantBackend`] talking to a Qdrant server over gRPC.
pub struct RemoteBackend {
    client: Qdrant,
}

impl RemoteBackend {
    /// Build a client for `url`. No request is sent until the first call.
    pub fn connect(
        url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DocvecError> {
        let mut builder = Qdrant::from_url(url).timeout(timeout);
        if let Some(api_key) = api_key {
            builder = builder.api_key(api_key);
        }
        let client = builder
            .build()
            .map_err(|e| DocvecError::VectorStore(format!("failed to build Qdrant client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing [`Qdrant`] client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    /// Return a reference to the underlying Qdrant client.
    pub fn client(&self) -> &Qdrant {
        &self.client
    }
}

fn map_err(action: &'static str) -> impl Fn(QdrantError) -> DocvecError {
    move |e| DocvecError::VectorStore(format!("{action} failed: {e}"))
}

#[async_trait]
impl QdrantBackend for RemoteBackend {
    async fn list_collections(&self) -> Result<Vec<String>, DocvecError> {
        let response = self
            .client
            .list_collections()
            .await
            .map_err(map_err("list collections"))?;
        let mut names: Vec<String> = response
            .collections
            .into_iter()
            .map(|c| c.name)
            .collect();
        names.sort();
        Ok(names)
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, DocvecError> {
        self.client
            .collection_exists(name)
            .await
            .map_err(map_err("collection_exists check"))
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionInfo, DocvecError> {
        let response = self
            .client
            .collection_info(name)
            .await
            .map_err(map_err("collection info"))?;
        let info = response.result.ok_or_else(|| {
            DocvecError::VectorStore(format!("no info returned for collection '{name}'"))
        })?;
        Ok(CollectionInfo {
            name: name.to_string(),
            status: info.status().into(),
            points_count: info.points_count,
        })
    }

    async fn recreate_collection(
        &self,
        name: &str,
        vector_size: u64,
        distance: DistanceMetric,
    ) -> Result<(), DocvecError> {
        if self.collection_exists(name).await? {
            self.delete_collection(name).await?;
        }
        let vectors = VectorParamsBuilder::new(vector_size, Distance::from(distance));
        self.client
            .create_collection(CreateCollectionBuilder::new(name).vectors_config(vectors))
            .await
            .map_err(map_err("create collection"))?;
        debug!(collection = name, vector_size, "created qdrant collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), DocvecError> {
        self.client
            .delete_collection(name)
            .await
            .map_err(map_err("delete collection"))?;
        debug!(collection = name, "deleted qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<Point>) -> Result<(), DocvecError> {
        let count = points.len();
        let points: Vec<PointStruct> = points
            .into_iter()
            .map(|p| {
                let payload: HashMap<String, QdrantValue> = p
                    .payload
                    .iter()
                    .map(|(k, v)| (k.clone(), json_to_qdrant(v)))
                    .collect();
                PointStruct::new(p.id, p.vector, payload)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(map_err("upsert"))?;
        debug!(collection, count, "upserted points to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        request: SearchRequest,
    ) -> Result<Vec<ScoredPayload>, DocvecError> {
        let mut builder = SearchPointsBuilder::new(collection, request.vector, request.limit)
            .with_payload(true)
            .params(
                SearchParamsBuilder::default()
                    .hnsw_ef(request.hnsw_ef)
                    .exact(request.exact),
            );
        if let Some(filter) = request.filter.as_ref() {
            builder = builder.filter(filter.to_qdrant());
        }

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(map_err("search"))?;

        Ok(response.result.into_iter().map(scored_point).collect())
    }
}

impl From<QdrantCollectionStatus> for CollectionStatus {
    fn from(status: QdrantCollectionStatus) -> Self {
        match status {
            QdrantCollectionStatus::Green => CollectionStatus::Green,
            QdrantCollectionStatus::Yellow => CollectionStatus::Yellow,
            QdrantCollectionStatus::Red => CollectionStatus::Red,
            QdrantCollectionStatus::Grey => CollectionStatus::Grey,
            _ => CollectionStatus::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a `serde_json::Value` into a `qdrant_client::qdrant::Value`.
fn json_to_qdrant(json: &JsonValue) -> QdrantValue {
    let kind = match json {
        JsonValue::Null => Some(Kind::NullValue(0)),
        JsonValue::Bool(b) => Some(Kind::BoolValue(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Kind::IntegerValue(i))
            } else {
                Some(Kind::DoubleValue(n.as_f64().unwrap_or(0.0)))
            }
        }
        JsonValue::String(s) => Some(Kind::StringValue(s.clone())),
        JsonValue::Array(arr) => {
            let values: Vec<QdrantValue> = arr.iter().map(json_to_qdrant).collect();
            Some(Kind::ListValue(qdrant_client::qdrant::ListValue { values }))
        }
        JsonValue::Object(map) => {
            let fields: HashMap<String, QdrantValue> = map
                .iter()
                .map(|(k, v)| (k.clone(), json_to_qdrant(v)))
                .collect();
            Some(Kind::StructValue(qdrant_client::qdrant::Struct { fields }))
        }
    };
    QdrantValue { kind }
}

/// Convert a `qdrant_client::qdrant::Value` into a `serde_json::Value`.
fn qdrant_to_json(val: &QdrantValue) -> JsonValue {
    match &val.kind {
        None | Some(Kind::NullValue(_)) => JsonValue::Null,
        Some(Kind::BoolValue(b)) => JsonValue::Bool(*b),
        Some(Kind::IntegerValue(i)) => JsonValue::Number((*i).into()),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(*d)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Some(Kind::StringValue(s)) => JsonValue::String(s.clone()),
        Some(Kind::ListValue(list)) => {
            JsonValue::Array(list.values.iter().map(qdrant_to_json).collect())
        }
        Some(Kind::StructValue(st)) => JsonValue::Object(
            st.fields
                .iter()
                .map(|(k, v)| (k.clone(), qdrant_to_json(v)))
                .collect(),
        ),
    }
}

fn point_id_to_string(id: Option<&PointId>) -> String {
    match id.and_then(|pid| pid.point_id_options.as_ref()) {
        Some(PointIdOptions::Uuid(s)) => s.clone(),
        Some(PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    }
}

fn scored_point(sp: ScoredPoint) -> ScoredPayload {
    let payload: Map<String, JsonValue> = sp
        .payload
        .iter()
        .map(|(k, v)| (k.clone(), qdrant_to_json(v)))
        .collect();
    ScoredPayload {
        id: point_id_to_string(sp.id.as_ref()),
        score: sp.score,
        payload,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
