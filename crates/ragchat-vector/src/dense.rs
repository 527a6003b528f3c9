use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tracing::{info, warn};

use ragchat_core::error::{Error, Result};
use ragchat_core::traits::{Embedder, SearchEngine, VectorIndexer};
use ragchat_core::types::{Chunk, RetrievalMethod, RetrievedDocument};

/// Semantic index: chunk content is embedded on `index`, the query on `query`.
///
/// Query-side failures (embedding service down, store unreadable) are logged
/// and yield an empty result so retrieval can carry on with the lexical side.
pub struct DenseIndex<V: VectorIndexer> {
	embedder: Arc<dyn Embedder>,
	store: V,
	batch_size: usize,
}

impl<V: VectorIndexer> DenseIndex<V> {
	pub fn new(embedder: Arc<dyn Embedder>, store: V, batch_size: usize) -> Self {
		Self { embedder, store, batch_size: batch_size.max(1) }
	}

	pub fn store(&self) -> &V { &self.store }

	pub async fn count(&self) -> Result<usize> { self.store.count().await }

	async fn try_query(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>> {
		let mut vecs = self.embedder.embed_batch(&[query.to_string()]).await?;
		let q = vecs.pop().ok_or_else(|| Error::Embedding("empty embedding response".to_string()))?;
		let hits = self.store.search_vec(&q, k).await?;
		Ok(hits
			.into_iter()
			.take(k)
			.map(|h| {
				let similarity = h.similarity();
				RetrievedDocument::new(h.chunk, Some(similarity), RetrievalMethod::Vector)
			})
			.collect())
	}
}

fn progress_bar(len: usize) -> ProgressBar {
	let pb = ProgressBar::new(len as u64);
	let style = ProgressStyle::default_bar()
		.template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
		.unwrap_or_else(|_| ProgressStyle::default_bar())
		.progress_chars("#>-");
	pb.set_style(style);
	pb
}

#[async_trait]
impl<V: VectorIndexer> SearchEngine for DenseIndex<V> {
	async fn index(&self, chunks: &[Chunk]) -> Result<()> {
		if chunks.is_empty() { return Ok(()); }
		info!(chunks = chunks.len(), embedder = self.embedder.id(), "embedding chunks");
		let pb = progress_bar(chunks.len());
		for batch in chunks.chunks(self.batch_size) {
			let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
			let embeddings = self.embedder.embed_batch(&texts).await?;
			if embeddings.len() != batch.len() {
				pb.abandon();
				return Err(Error::Embedding(format!("{} texts but {} embeddings", batch.len(), embeddings.len())));
			}
			self.store.index(batch, &embeddings).await?;
			pb.inc(batch.len() as u64);
		}
		pb.finish_with_message("done");
		Ok(())
	}

	async fn query(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>> {
		if k == 0 { return Ok(Vec::new()); }
		match self.try_query(query, k).await {
			Ok(docs) => Ok(docs),
			Err(e) => {
				warn!(error = %e, "dense query failed; returning no vector results");
				Ok(Vec::new())
			}
		}
	}
}
