use async_trait::async_trait;
use docvec_core::{DocvecError, Embeddings};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Embeddings from the OpenAI `/embeddings` endpoint.
pub struct OpenAiEmbeddings {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    dimensions: usize,
}

impl OpenAiEmbeddings {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Result<Self, DocvecError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(DocvecError::Config(
                "OpenAI API key must not be empty".to_string(),
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            dimensions,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl Embeddings for OpenAiEmbeddings {
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, DocvecError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(
            provider = "openai",
            model = %self.model,
            batch_size = texts.len(),
            "embedding batch"
        );

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| {
                error!(provider = "openai", error = %e, "request failed");
                DocvecError::Embedding(format!("OpenAI request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(DocvecError::Embedding(format!(
                "OpenAI API error ({status}): {detail}"
            )));
        }

        let mut parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            DocvecError::Embedding(format!("failed to parse OpenAI response: {e}"))
        })?;
        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, DocvecError> {
        self.embed_documents(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DocvecError::Embedding("OpenAI returned no embedding".to_string()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
