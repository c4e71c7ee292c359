use async_trait::async_trait;
use docvec_core::{DocvecError, Embeddings};

/// Deterministic, offline embeddings for tests and demos.
///
/// Each byte of the input is folded into one of `dimensions` buckets and the
/// result is scaled to unit length, so equal texts always map to equal vectors.
#[derive(Debug, Clone)]
pub struct FakeEmbeddings {
    dimensions: usize,
}

impl FakeEmbeddings {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return vec;
        }
        for (i, byte) in text.bytes().enumerate() {
            vec[i % self.dimensions] += (byte as f32 + 1.0) / 256.0;
        }
        let mag: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if mag > 0.0 {
            vec.iter_mut().for_each(|x| *x /= mag);
        }
        vec
    }
}

impl Default for FakeEmbeddings {
    fn default() -> Self {
        Self::new(4)
    }
}

#[async_trait]
impl Embeddings for FakeEmbeddings {
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, DocvecError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, DocvecError> {
        Ok(self.embed_text(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
