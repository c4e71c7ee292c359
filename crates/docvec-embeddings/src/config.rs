use std::sync::Arc;

use docvec_core::{DocvecError, Embeddings};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{fake::FakeEmbeddings, ollama, ollama::OllamaEmbeddings, openai, OpenAiEmbeddings};

/// Which embedding backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingModelType {
    OpenAi,
    Ollama,
    Fake,
}

/// Selects and parameterizes an embedding provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingModelsConfig {
    pub model_type: EmbeddingModelType,
    /// Provider-specific model name. Ignored by `fake`.
    pub model_name: String,
    /// Output dimensionality of `model_name`.
    pub dims: usize,
    /// Overrides the provider's default endpoint.
    pub base_url: Option<String>,
    /// Environment variable holding the API key (OpenAI only).
    pub api_key_env: String,
}

impl Default for EmbeddingModelsConfig {
    fn default() -> Self {
        Self::openai()
    }
}

impl EmbeddingModelsConfig {
    /// OpenAI `text-embedding-ada-002`, 1536 dimensions.
    pub fn openai() -> Self {
        Self {
            model_type: EmbeddingModelType::OpenAi,
            model_name: "text-embedding-ada-002".to_string(),
            dims: 1536,
            base_url: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }

    pub fn ollama(model_name: impl Into<String>, dims: usize) -> Self {
        Self {
            model_type: EmbeddingModelType::Ollama,
            model_name: model_name.into(),
            dims,
            ..Self::openai()
        }
    }

    pub fn fake(dims: usize) -> Self {
        Self {
            model_type: EmbeddingModelType::Fake,
            model_name: "fake".to_string(),
            dims,
            ..Self::openai()
        }
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>, dims: usize) -> Self {
        self.model_name = model_name.into();
        self.dims = dims;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key_env(mut self, api_key_env: impl Into<String>) -> Self {
        self.api_key_env = api_key_env.into();
        self
    }
}

/// Build the embedding provider named by `config`.
pub fn create_embeddings(
    config: &EmbeddingModelsConfig,
) -> Result<Arc<dyn Embeddings>, DocvecError> {
    if config.dims == 0 {
        return Err(DocvecError::Config(
            "embedding dimensionality must be greater than zero".to_string(),
        ));
    }
    debug!(
        model_type = ?config.model_type,
        model = %config.model_name,
        dims = config.dims,
        "resolving embedding provider"
    );

    let embeddings: Arc<dyn Embeddings> = match config.model_type {
        EmbeddingModelType::Fake => Arc::new(FakeEmbeddings::new(config.dims)),
        EmbeddingModelType::Ollama => Arc::new(
            OllamaEmbeddings::new(&config.model_name, config.dims).with_base_url(
                config
                    .base_url
                    .as_deref()
                    .unwrap_or(ollama::DEFAULT_BASE_URL),
            ),
        ),
        EmbeddingModelType::OpenAi => {
            let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                DocvecError::Config(format!(
                    "{} environment variable not set",
                    config.api_key_env
                ))
            })?;
            Arc::new(
                OpenAiEmbeddings::new(api_key, &config.model_name, config.dims)?.with_base_url(
                    config
                        .base_url
                        .as_deref()
                        .unwrap_or(openai::DEFAULT_BASE_URL),
                ),
            )
        }
    };
    Ok(embeddings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_openai_ada() {
        let config = EmbeddingModelsConfig::default();
        assert_eq!(config.model_type, EmbeddingModelType::OpenAi);
        assert_eq!(config.model_name, "text-embedding-ada-002");
        assert_eq!(config.dims, 1536);
    }

    #[test]
    fn model_type_uses_lowercase_names() {
        let json = serde_json::to_string(&EmbeddingModelType::OpenAi).unwrap();
        assert_eq!(json, "\"openai\"");
        let parsed: EmbeddingModelType = serde_json::from_str("\"ollama\"").unwrap();
        assert_eq!(parsed, EmbeddingModelType::Ollama);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: EmbeddingModelsConfig =
            serde_json::from_str(r#"{"model_type": "fake", "dims": 8}"#).unwrap();
        assert_eq!(config.model_type, EmbeddingModelType::Fake);
        assert_eq!(config.dims, 8);
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
    }
}
