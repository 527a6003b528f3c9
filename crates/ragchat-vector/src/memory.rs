//! In-memory vector store using cosine distance.

use async_trait::async_trait;
use tokio::sync::RwLock;

use ragchat_core::error::Result;
use ragchat_core::traits::VectorIndexer;
use ragchat_core::types::{Chunk, VectorHit};

/// Vectors held in a `Vec` behind a `tokio::sync::RwLock`. Suitable for tests
/// and corpora small enough to scan linearly.
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    entries: RwLock<Vec<(Chunk, Vec<f32>)>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self { Self::default() }
}

/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndexer for InMemoryVectorIndex {
    async fn index(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.extend(chunks.iter().cloned().zip(embeddings.iter().cloned()));
        Ok(())
    }

    async fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<VectorHit>> {
        let entries = self.entries.read().await;
        let mut hits: Vec<VectorHit> = entries
            .iter()
            .map(|(chunk, v)| VectorHit { chunk: chunk.clone(), distance: 1.0 - cosine_similarity(v, query_vec) })
            .collect();
        hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }

    async fn count(&self) -> Result<usize> { Ok(self.entries.read().await.len()) }
}
