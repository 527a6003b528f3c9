use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use ragchat_core::config::{EmbeddingProvider, EmbeddingSettings};
use ragchat_core::error::{Error, Result};
use ragchat_core::traits::Embedder;

/// Embeddings from an Ollama server (`POST /api/embeddings`), one request per text.
pub struct OllamaEmbedder { client: Client, base_url: String, model: String, dim: usize, id: String }

#[derive(Serialize)]
struct EmbedRequest<'a> { model: &'a str, prompt: &'a str }

#[derive(Deserialize)]
struct EmbedResponse { embedding: Vec<f32> }

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str, dim: usize, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).pool_max_idle_per_host(5).build()
            .map_err(|e| Error::Embedding(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string(), model: model.to_string(), dim, id: format!("ollama:{model}") })
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self.client.post(&url).json(&EmbedRequest { model: &self.model, prompt: text }).send().await
            .map_err(|e| Error::Embedding(format!("Embedding request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Embedding(format!("Embedding failed: HTTP {}", response.status())));
        }
        let body: EmbedResponse = response.json().await
            .map_err(|e| Error::Embedding(format!("Failed to parse embedding response: {e}")))?;
        if body.embedding.len() != self.dim {
            return Err(Error::Embedding(format!("Expected {}-dim embedding from {}, got {}", self.dim, self.model, body.embedding.len())));
        }
        Ok(body.embedding)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for t in texts { out.push(self.embed_one(t).await?); }
        debug!(count = out.len(), model = %self.model, "embedded batch");
        Ok(out)
    }
}

/// Deterministic bag-of-words hashing embedder, L2-normalized. Texts sharing
/// words land close together, which is enough for offline runs and tests.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher}; use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() { let token = token.to_lowercase(); let mut hasher = XxHash64::with_seed(0); token.hash(&mut hasher); let h = hasher.finish(); let idx = (h as usize) % self.dim; let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32); v[idx] += val + (i as f32 % 3.0) * 0.01; }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6); for x in &mut v { *x /= norm; } v
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    fn id(&self) -> &str { "fake" }
    fn dim(&self) -> usize { self.dim }
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { Ok(texts.iter().map(|t| self.embed_text(t)).collect()) }
}

pub fn get_default_embedder(settings: &EmbeddingSettings, base_url: &str, timeout: Duration) -> Result<Box<dyn Embedder>> {
    match settings.provider {
        EmbeddingProvider::Fake => { info!(dim = settings.dimension, "using FakeEmbedder"); Ok(Box::new(FakeEmbedder::new(settings.dimension))) }
        EmbeddingProvider::Ollama => { info!(model = %settings.model, "using Ollama embeddings"); Ok(Box::new(OllamaEmbedder::new(base_url, &settings.model, settings.dimension, timeout)?)) }
    }
}
