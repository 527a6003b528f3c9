use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};

use ragchat_core::config::Settings;
use ragchat_core::data_processor::{save_chunks, Chunker, DataProcessor};
use ragchat_core::traits::{SearchEngine, VectorIndexer};
use ragchat_core::types::Chunk;
use ragchat_hybrid::HybridRetriever;
use ragchat_text::TantivyIndexer;
use ragchat_vector::DenseIndex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub chunks: usize,
    pub sparse_indexed: bool,
    /// `false` when the persistent store already held vectors and was reused.
    pub dense_indexed: bool,
    pub dense_documents: usize,
}

/// Extract and chunk every supported source under `data_dir`, writing a
/// readable copy of each source's chunks into `processed_dir`.
pub fn process_sources(settings: &Settings) -> Result<Vec<Chunk>> {
    let processor = DataProcessor::new(Chunker::new(settings.chunk_size, settings.chunk_overlap)?);
    let processed_dir = settings.processed_path();
    let mut chunks = Vec::new();
    for source in processor.process_directory(&settings.data_path()) {
        let name = processed_name(&source.path);
        if let Err(e) = save_chunks(&source.chunks, &processed_dir, &name) {
            warn!(file = %name, error = %e, "could not save processed chunks");
        }
        chunks.extend(source.chunks);
    }
    info!(chunks = chunks.len(), "sources processed");
    Ok(chunks)
}

fn processed_name(path: &Path) -> String {
    let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_else(|| "source".to_string());
    format!("{stem}.txt")
}

/// Make both indexes ready. The in-memory sparse index is always rebuilt; the
/// dense store is filled only when empty or when `refresh_dense` is set
/// (callers reset the store first in that case).
pub async fn load_indexes<V>(
    retriever: &HybridRetriever<DenseIndex<V>, TantivyIndexer>,
    chunks: &[Chunk],
    refresh_dense: bool,
) -> IngestReport
where
    V: VectorIndexer,
{
    let mut report = IngestReport { chunks: chunks.len(), ..IngestReport::default() };

    match retriever.sparse().index(chunks).await {
        Ok(()) => report.sparse_indexed = true,
        Err(e) => warn!(error = %e, "sparse index unavailable; retrieval will be dense-only"),
    }

    let dense = retriever.dense();
    let existing = match dense.count().await {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "could not read dense store size");
            0
        }
    };
    if refresh_dense || existing == 0 {
        match dense.index(chunks).await {
            Ok(()) => report.dense_indexed = true,
            Err(e) => warn!(error = %e, "dense indexing failed; retrieval will be sparse-only"),
        }
    } else {
        info!(documents = existing, "reusing persisted vector store");
    }
    report.dense_documents = dense.count().await.unwrap_or(existing);
    report
}
