//! ragchat-cli
//!
//! Wires the retrieval and generation crates into a question-answering
//! session. `chat::RagChat` runs one question at a time; `ingest` builds the
//! indexes from the data directory; `models` talks to the generation service
//! about installed models; `repl` parses and renders the interactive commands.
pub mod chat;
pub mod ingest;
pub mod models;
pub mod repl;

pub use chat::{RagChat, Stage};
