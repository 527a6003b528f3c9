use std::fmt;
use tracing::info;

use ragchat_core::config::Settings;
use ragchat_core::history::ConversationHistory;
use ragchat_core::traits::SearchEngine;
use ragchat_hybrid::HybridRetriever;
use ragchat_llm::PromptDispatcher;

/// Progress notifications for the front end, in the order they fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Retrieving,
    Retrieved { documents: usize },
    /// Retrieval found nothing; the sentinel answer follows without generation.
    NoContext,
    Generating,
    Answered,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retrieving => f.write_str("Searching lecture notes..."),
            Self::Retrieved { documents } => write!(f, "Found {documents} relevant passages"),
            Self::NoContext => f.write_str("No relevant passages found"),
            Self::Generating => f.write_str("Generating answer..."),
            Self::Answered => f.write_str("Done"),
        }
    }
}

/// One question answered at a time: retrieve, dispatch, record the turn.
pub struct RagChat<D, S> where D: SearchEngine, S: SearchEngine {
    retriever: HybridRetriever<D, S>,
    dispatcher: PromptDispatcher,
    history: ConversationHistory,
    top_k: usize,
}

impl<D, S> RagChat<D, S> where D: SearchEngine, S: SearchEngine {
    pub fn new(retriever: HybridRetriever<D, S>, dispatcher: PromptDispatcher, settings: &Settings) -> Self {
        Self { retriever, dispatcher, history: ConversationHistory::new(settings.history_capacity), top_k: settings.top_k }
    }

    pub fn retriever(&self) -> &HybridRetriever<D, S> { &self.retriever }

    pub fn history(&self) -> &ConversationHistory { &self.history }

    pub fn clear_history(&mut self) {
        self.history.clear();
        info!("conversation history cleared");
    }

    /// Always yields answer text: a generated answer, the no-context sentinel
    /// or a rendered error block.
    pub async fn generate_response<F>(&mut self, question: &str, mut progress: F) -> String
    where
        F: FnMut(Stage),
    {
        progress(Stage::Retrieving);
        let context = self.retriever.retrieve(question, self.top_k).await;
        progress(Stage::Retrieved { documents: context.len() });
        if context.is_empty() {
            progress(Stage::NoContext);
        } else {
            progress(Stage::Generating);
        }
        let answer = self.dispatcher.respond(question, &context).await;
        info!(documents = context.len(), answer_chars = answer.len(), "question answered");
        self.history.push(question, answer.clone());
        progress(Stage::Answered);
        answer
    }
}
