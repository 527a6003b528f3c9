//! ragchat-vector
//!
//! Dense retrieval: [`DenseIndex`] embeds chunks and queries through an
//! [`Embedder`](ragchat_core::traits::Embedder), storing vectors in any
//! [`VectorIndexer`](ragchat_core::traits::VectorIndexer). Two stores ship here:
//! the persistent LanceDB table and an in-memory one for tests and small corpora.
pub mod dense;
pub mod memory;
pub mod schema;
pub mod writer;

pub use dense::DenseIndex;
pub use memory::InMemoryVectorIndex;
pub use writer::LanceDbIndexer;
