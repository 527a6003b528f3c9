//! ragchat-llm
//!
//! Everything between retrieved context and the final answer text: the
//! generation client, question classification, prompt construction,
//! strategy dispatch and the optional reflection pass.
pub mod classify;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod prompt;
pub mod reflection;

pub use classify::{classify, QuestionType};
pub use client::{GenerateOptions, Generator, OllamaClient};
pub use dispatch::{GenerationPlan, PromptDispatcher};
pub use error::GenerationError;
pub use reflection::ReflectionEngine;
