use async_trait::async_trait;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use ragchat_core::error::{Error, Result};
use ragchat_core::traits::SearchEngine;
use ragchat_core::types::{Chunk, RetrievedDocument};

/// Fans a query out to a dense and a sparse engine and merges the answers.
///
/// Ranking is positional: every dense result precedes every sparse result,
/// duplicates (same `content`) keep their first occurrence, and the merged
/// list is cut to `k`. Scores from the two sides are never compared.
pub struct HybridRetriever<D, S> where D: SearchEngine, S: SearchEngine {
    dense: D,
    sparse: S,
}

impl<D, S> HybridRetriever<D, S> where D: SearchEngine, S: SearchEngine {
    pub fn new(dense: D, sparse: S) -> Self { Self { dense, sparse } }

    pub fn dense(&self) -> &D { &self.dense }

    pub fn sparse(&self) -> &S { &self.sparse }

    /// Never fails: a side that errors contributes nothing, and if both fail
    /// the result is empty.
    pub async fn retrieve(&self, query: &str, k: usize) -> Vec<RetrievedDocument> {
        if k == 0 { return Vec::new(); }
        let (dense, sparse) = futures::join!(self.dense.query(query, k), self.sparse.query(query, k));
        let dense = dense.unwrap_or_else(|e| { warn!(error = %e, "dense retrieval failed; using sparse results only"); Vec::new() });
        let sparse = sparse.unwrap_or_else(|e| { warn!(error = %e, "sparse retrieval failed"); Vec::new() });
        debug!(dense = dense.len(), sparse = sparse.len(), "retrieved candidates");
        let merged = merge_results(dense, sparse, k);
        info!(documents = merged.len(), "hybrid retrieval complete");
        merged
    }
}

/// Dense-first concatenation, deduplicated on exact content, truncated to `k`.
pub fn merge_results(dense: Vec<RetrievedDocument>, sparse: Vec<RetrievedDocument>, k: usize) -> Vec<RetrievedDocument> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::with_capacity(k.min(dense.len() + sparse.len()));
    for doc in dense.into_iter().chain(sparse) {
        if merged.len() >= k { break; }
        if seen.insert(doc.chunk.content.clone()) { merged.push(doc); }
    }
    merged
}

#[async_trait]
impl<D, S> SearchEngine for HybridRetriever<D, S> where D: SearchEngine, S: SearchEngine {
    /// Adds to both engines. One failing side is logged; only a double failure is an error.
    async fn index(&self, chunks: &[Chunk]) -> Result<()> {
        let (dense, sparse) = futures::join!(self.dense.index(chunks), self.sparse.index(chunks));
        match (dense, sparse) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(e), Ok(())) => { warn!(error = %e, "dense indexing failed; sparse index only"); Ok(()) }
            (Ok(()), Err(e)) => { warn!(error = %e, "sparse indexing failed; dense index only"); Ok(()) }
            (Err(d), Err(s)) => Err(Error::index("hybrid", format!("dense: {d}; sparse: {s}"))),
        }
    }

    async fn query(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>> { Ok(self.retrieve(query, k).await) }
}
