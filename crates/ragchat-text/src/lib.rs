//! ragchat-text
//!
//! In-memory Tantivy BM25 index over chunk content. The index is rebuilt from
//! the processed sources at every startup; see `index::TantivyIndexer`.
pub mod tantivy_utils;
pub mod index;

pub use index::TantivyIndexer;
