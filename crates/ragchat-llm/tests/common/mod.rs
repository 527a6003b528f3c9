#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use ragchat_core::types::{Chunk, Locator, RetrievalMethod, RetrievedDocument};
use ragchat_llm::{GenerateOptions, GenerationError, Generator};

/// Replays queued responses in order and records every call.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    pub calls: Mutex<Vec<(String, GenerateOptions)>>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
        Self { responses: Mutex::new(responses.into()), calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<(String, GenerateOptions)> { self.calls.lock().unwrap().clone() }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn model(&self) -> String { "scripted".to_string() }

    async fn generate(&self, prompt: &str, _system: Option<&str>, options: GenerateOptions) -> Result<String, GenerationError> {
        self.calls.lock().unwrap().push((prompt.to_string(), options));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Client("no scripted response left".to_string())))
    }
}

pub fn server_error() -> GenerationError {
    GenerationError::Status { status: 500, body: "internal error".to_string() }
}

pub fn connection_error() -> GenerationError {
    GenerationError::Connection { url: "http://localhost:11434".to_string(), message: "connection refused".to_string() }
}

pub fn context() -> Vec<RetrievedDocument> {
    vec![
        RetrievedDocument::new(
            Chunk { id: "a".into(), source: "devops.pdf".into(), locator: Locator::page(4), content: "CI is a practice of merging code frequently.".into() },
            Some(0.87),
            RetrievalMethod::Vector,
        ),
        RetrievedDocument::new(
            Chunk { id: "b".into(), source: "architecture.pdf".into(), locator: Locator::span(12, 0, 900), content: "Microservices are small, independently deployable services.".into() },
            Some(7.5),
            RetrievalMethod::Bm25,
        ),
    ]
}
