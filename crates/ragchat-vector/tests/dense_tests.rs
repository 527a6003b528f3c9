use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;

use ragchat_core::error::{Error, Result};
use ragchat_core::traits::{Embedder, SearchEngine, VectorIndexer};
use ragchat_core::types::{Chunk, Locator, RetrievalMethod};
use ragchat_embed::FakeEmbedder;
use ragchat_vector::{DenseIndex, InMemoryVectorIndex, LanceDbIndexer};

fn chunk(id: &str, content: &str) -> Chunk {
    Chunk { id: id.to_string(), source: "devops.md".to_string(), locator: Locator::span(1, 0, 10), content: content.to_string() }
}

fn corpus() -> Vec<Chunk> {
    vec![
        chunk("a", "continuous integration merges code often"),
        chunk("b", "microservices are small independent services"),
        chunk("c", "a monolith ships as one deployable unit"),
    ]
}

struct BrokenEmbedder;

#[async_trait]
impl Embedder for BrokenEmbedder {
    fn id(&self) -> &str { "broken" }
    fn dim(&self) -> usize { 8 }
    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(Error::Embedding("connection refused".to_string()))
    }
}

#[tokio::test]
async fn in_memory_dense_ranks_closest_first() {
    let dense = DenseIndex::new(Arc::new(FakeEmbedder::new(128)), InMemoryVectorIndex::new(), 2);
    dense.index(&corpus()).await.unwrap();
    assert_eq!(dense.count().await.unwrap(), 3);

    let hits = dense.query("microservices are small independent services", 2).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].chunk.id, "b");
    assert_eq!(hits[0].retrieval_method, RetrievalMethod::Vector);
    let sim = hits[0].score.unwrap();
    assert!((sim - 1.0).abs() < 1e-4, "identical text has similarity ~1, got {sim}");
    assert!(hits[0].score >= hits[1].score);
}

#[tokio::test]
async fn embedding_failure_on_query_yields_empty() {
    let store = InMemoryVectorIndex::new();
    store.index(&corpus()[..1], &[vec![1.0; 8]]).await.unwrap();
    let dense = DenseIndex::new(Arc::new(BrokenEmbedder), store, 8);
    assert!(dense.query("anything", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn embedding_failure_on_index_is_reported() {
    let dense = DenseIndex::new(Arc::new(BrokenEmbedder), InMemoryVectorIndex::new(), 8);
    assert!(dense.index(&corpus()).await.is_err());
}

#[tokio::test]
async fn lancedb_store_round_trip() {
    let tmp = TempDir::new().unwrap();
    let store = LanceDbIndexer::new(tmp.path(), "lecture_notes", 32).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);
    assert!(store.search_vec(&[0.5; 32], 3).await.unwrap().is_empty());

    let dense = DenseIndex::new(Arc::new(FakeEmbedder::new(32)), store, 2);
    dense.index(&corpus()).await.unwrap();
    assert_eq!(dense.count().await.unwrap(), 3);

    let hits = dense.query("a monolith ships as one deployable unit", 2).await.unwrap();
    assert!(!hits.is_empty() && hits.len() <= 2);
    assert_eq!(hits[0].chunk.id, "c");
    assert_eq!(hits[0].chunk.locator, Locator::span(1, 0, 10));

    dense.store().reset().await.unwrap();
    assert_eq!(dense.count().await.unwrap(), 0);
}

#[tokio::test]
async fn lancedb_rejects_wrong_dimension() {
    let tmp = TempDir::new().unwrap();
    let store = LanceDbIndexer::new(tmp.path(), "t", 4).await.unwrap();
    assert!(store.index(&corpus()[..1], &[vec![0.0; 3]]).await.is_err());
}
