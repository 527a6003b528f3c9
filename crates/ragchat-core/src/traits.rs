use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Chunk, RetrievedDocument, VectorHit};

/// Turns text into fixed-size vectors. Usually a remote embedding service.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `ollama:nomic-embed-text`).
    fn id(&self) -> &str;
    fn dim(&self) -> usize;
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Storage for precomputed chunk embeddings with nearest-neighbour lookup.
#[async_trait]
pub trait VectorIndexer: Send + Sync {
    async fn index(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<()>;
    /// Hits ordered by ascending distance, at most `k`.
    async fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<VectorHit>>;
    async fn count(&self) -> Result<usize>;
}

/// A retrieval engine over chunks: the sparse index, the dense index and the
/// hybrid retriever all expose this surface.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    async fn index(&self, chunks: &[Chunk]) -> Result<()>;
    /// Ordered results, at most `k`.
    async fn query(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>>;
}
