use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// One source could not be read; the batch it belongs to carries on.
    #[error("Failed to extract '{source_id}': {message}")]
    Extraction { source_id: String, message: String },

    /// A single index failed to add or query; retrieval degrades to the other index.
    #[error("Index error ({engine}): {message}")]
    Index { engine: String, message: String },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn extraction(source_id: impl Into<String>, message: impl ToString) -> Self {
        Self::Extraction { source_id: source_id.into(), message: message.to_string() }
    }

    pub fn index(engine: impl Into<String>, message: impl ToString) -> Self {
        Self::Index { engine: engine.into(), message: message.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
