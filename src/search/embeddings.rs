//! Query embedding providers
//!
//! The embedding model is external. [`HttpEmbedder`] calls a model server;
//! [`HashEmbedder`] is a deterministic, model-free stand-in for offline use
//! and tests.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::EmbeddingConfig;
use crate::error::{Result, SearchError};

/// Text → fixed-length vector. Must be deterministic for identical input.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Output dimension.
    fn dims(&self) -> usize;

    /// Short identifier for health output.
    fn name(&self) -> &str;
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Hash embedder using FNV-1a
///
/// Feature hashing over lowercase word unigrams and adjacent bigrams with a
/// sign bit, L2-normalized. Texts sharing vocabulary land close together.
pub struct HashEmbedder {
    /// Embedding dimension (default: 384)
    dim: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dim: 384 }
    }
}

impl HashEmbedder {
    /// Create embedder with specified dimension
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    /// Embed text into vector
    #[must_use]
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        let tokens: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();

        let mut add = |feature: &str, weight: f32| {
            let hash = fnv1a(feature.as_bytes());
            let idx = (hash % self.dim as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign * weight;
        };

        for token in &tokens {
            add(token, 1.0);
        }
        for pair in tokens.windows(2) {
            add(&format!("{} {}", pair[0], pair[1]), 0.5);
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }

    /// Compute cosine similarity between two embeddings
    #[must_use]
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        cosine_similarity(a, b)
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn dims(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// Cosine similarity; mismatched lengths or zero vectors score 0.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Embedding server client.
///
/// POSTs `{"input": text}` and accepts either `{"embedding": [...]}` or the
/// OpenAI-style `{"data": [{"embedding": [...]}]}`.
pub struct HttpEmbedder {
    endpoint: String,
    dims: usize,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbeddingResponse {
    Flat { embedding: Vec<f32> },
    Data { data: Vec<EmbeddingDatum> },
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    pub fn new(endpoint: &str, dims: usize, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|err| SearchError::Config(format!("embedding http client: {err}")))?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            dims,
            client,
        })
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let endpoint = config.endpoint.as_deref().ok_or_else(|| {
            SearchError::MissingConfig("embedding.endpoint is required for the http provider".into())
        })?;
        Self::new(endpoint, config.dims, config.timeout_secs)
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "input": text }))
            .send()
            .map_err(|err| SearchError::EmbeddingFailure(format!("request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(SearchError::EmbeddingFailure(format!(
                "embedding HTTP {}",
                response.status()
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .map_err(|err| SearchError::EmbeddingFailure(format!("response parse: {err}")))?;

        let vector = match body {
            EmbeddingResponse::Flat { embedding } => embedding,
            EmbeddingResponse::Data { mut data } => {
                if data.is_empty() {
                    return Err(SearchError::EmbeddingFailure(
                        "response contained no embeddings".to_string(),
                    ));
                }
                data.swap_remove(0).embedding
            }
        };

        if vector.len() != self.dims {
            return Err(SearchError::EmbeddingFailure(format!(
                "expected {} dimensions, got {}",
                self.dims,
                vector.len()
            )));
        }

        debug!(target: "search", dims = vector.len(), "query embedded");
        Ok(vector)
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "http"
    }
}
