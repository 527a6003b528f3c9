use anyhow::{bail, Result};
use std::path::Path;
use tracing::{info, warn};

use ragchat_core::traits::VectorIndexer;
use ragchat_llm::{Generator, OllamaClient};
use ragchat_vector::DenseIndex;

const LISTED_PROCESSED_FILES: usize = 5;

/// Switch generation to `model`, which must already be installed.
pub async fn switch_model(client: &OllamaClient, model: &str) -> Result<()> {
    let models = client.list_models().await?;
    if !models.iter().any(|m| m == model) {
        bail!("model '{model}' is not available; installed: {}", models.join(", "));
    }
    client.set_model(model);
    info!(%model, "switched model");
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub model: String,
    pub available_models: Vec<String>,
    pub dense_documents: usize,
    /// First few processed files, sorted.
    pub processed_files: Vec<String>,
}

pub async fn system_info<V: VectorIndexer>(client: &OllamaClient, dense: &DenseIndex<V>, processed_dir: &Path) -> SystemInfo {
    let available_models = client.list_models().await.unwrap_or_else(|e| {
        warn!(error = %e, "could not list models");
        Vec::new()
    });
    let dense_documents = dense.count().await.unwrap_or(0);
    let mut processed_files: Vec<String> = walkdir::WalkDir::new(processed_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    processed_files.sort();
    processed_files.truncate(LISTED_PROCESSED_FILES);
    SystemInfo { model: client.model(), available_models, dense_documents, processed_files }
}
