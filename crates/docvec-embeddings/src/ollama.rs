use async_trait::async_trait;
use docvec_core::{DocvecError, Embeddings};
use serde_json::{json, Value};
use tracing::debug;

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Embeddings from a local Ollama server's `/api/embed` endpoint.
pub struct OllamaEmbeddings {
    client: reqwest::Client,
    model: String,
    base_url: String,
    dimensions: usize,
}

impl OllamaEmbeddings {
    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            dimensions,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Embeddings for OllamaEmbeddings {
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, DocvecError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(
            provider = "ollama",
            model = %self.model,
            batch_size = texts.len(),
            "embedding batch"
        );

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&json!({
                "model": self.model,
                "input": texts,
            }))
            .send()
            .await
            .map_err(|e| DocvecError::Embedding(format!("Ollama request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocvecError::Embedding(format!(
                "Ollama API error ({status}): {body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DocvecError::Embedding(format!("failed to parse Ollama response: {e}")))?;

        let embeddings = body
            .get("embeddings")
            .and_then(|e| e.as_array())
            .ok_or_else(|| DocvecError::Embedding("missing 'embeddings' field".to_string()))?;

        embeddings
            .iter()
            .enumerate()
            .map(|(i, row)| parse_row(i, row))
            .collect()
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, DocvecError> {
        self.embed_documents(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DocvecError::Embedding("Ollama returned no embedding".to_string()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Every value of an embedding row must be a number.
fn parse_row(index: usize, row: &Value) -> Result<Vec<f32>, DocvecError> {
    let values = row.as_array().ok_or_else(|| {
        DocvecError::Embedding(format!("embedding row {index} is not an array"))
    })?;
    values
        .iter()
        .map(|v| {
            v.as_f64().map(|f| f as f32).ok_or_else(|| {
                DocvecError::Embedding(format!("embedding row {index} has non-numeric value {v}"))
            })
        })
        .collect()
}
