use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use ragchat_core::config::GenerationSettings;
use ragchat_core::types::RetrievedDocument;

use crate::classify::{classify, QuestionType};
use crate::client::{GenerateOptions, Generator};
use crate::prompt::{
    format_context, rag_prompt, structured_prompt, wants_example, with_example, StructuredFormat,
    DEFAULT_SYSTEM_PROMPT, FEW_SHOT_EXAMPLES, NO_CONTEXT_MESSAGE,
};
use crate::reflection::ReflectionEngine;

/// What to send to the generator for one question.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationPlan {
    /// Retrieval found nothing; answer with the sentinel, no generation.
    NoContext,
    Rag { prompt: String },
    /// `fallback_prompt` is the plain RAG prompt used if the structured call fails.
    Structured { format: StructuredFormat, prompt: String, fallback_prompt: String },
    /// RAG prompt whose answer goes through the reflection pass.
    Reflective { prompt: String },
}

impl GenerationPlan {
    pub fn prompt(&self) -> Option<&str> {
        match self {
            Self::NoContext => None,
            Self::Rag { prompt } | Self::Structured { prompt, .. } | Self::Reflective { prompt } => Some(prompt),
        }
    }
}

/// Picks a strategy per question type and runs it against the generator.
/// Always returns answer text: generation failures become a markdown error block.
pub struct PromptDispatcher {
    generator: Arc<dyn Generator>,
    reflection: ReflectionEngine,
    system_prompt: String,
    prompt_budget_chars: usize,
    rng: Mutex<StdRng>,
}

impl PromptDispatcher {
    pub fn new(generator: Arc<dyn Generator>, settings: &GenerationSettings) -> Self {
        let system_prompt = settings.system_prompt.clone().unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        let reflection = ReflectionEngine::from_settings(generator.clone(), system_prompt.clone(), settings);
        Self {
            generator,
            reflection,
            system_prompt,
            prompt_budget_chars: settings.prompt_budget_chars,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Fix the example-selection seed for reproducible prompts.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn build_generation_plan(&self, question: &str, context: &[RetrievedDocument], question_type: QuestionType) -> GenerationPlan {
        if context.is_empty() {
            return GenerationPlan::NoContext;
        }
        let context_text = format_context(context);
        match question_type {
            QuestionType::Factual => GenerationPlan::Rag { prompt: self.rag_prompt(question, &context_text) },
            QuestionType::Comparative => self.structured(question, &context_text, StructuredFormat::Comparison),
            QuestionType::Procedural => self.structured(question, &context_text, StructuredFormat::Steps),
            QuestionType::Complex => GenerationPlan::Reflective { prompt: self.rag_prompt(question, &context_text) },
        }
    }

    fn structured(&self, question: &str, context_text: &str, format: StructuredFormat) -> GenerationPlan {
        GenerationPlan::Structured {
            format,
            prompt: structured_prompt(question, context_text, format),
            fallback_prompt: self.rag_prompt(question, context_text),
        }
    }

    /// RAG prompt, plus one worked example when the question calls for it and
    /// the result still fits the budget.
    fn rag_prompt(&self, question: &str, context_text: &str) -> String {
        let prompt = rag_prompt(question, context_text);
        if !wants_example(question) {
            return prompt;
        }
        let example = {
            let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
            FEW_SHOT_EXAMPLES.choose(&mut *rng)
        };
        match example {
            Some(example) => {
                let extended = with_example(&prompt, example);
                if extended.chars().count() <= self.prompt_budget_chars { extended } else { prompt }
            }
            None => prompt,
        }
    }

    /// Classify, plan and generate.
    pub async fn respond(&self, question: &str, context: &[RetrievedDocument]) -> String {
        let question_type = classify(question);
        info!(%question_type, documents = context.len(), "dispatching question");
        self.execute(question, context, self.build_generation_plan(question, context, question_type)).await
    }

    pub async fn execute(&self, question: &str, context: &[RetrievedDocument], plan: GenerationPlan) -> String {
        let system = Some(self.system_prompt.as_str());
        match plan {
            GenerationPlan::NoContext => NO_CONTEXT_MESSAGE.to_string(),
            GenerationPlan::Rag { prompt } => match self.generator.generate(&prompt, system, GenerateOptions::default()).await {
                Ok(answer) => answer,
                Err(e) => e.to_markdown(),
            },
            GenerationPlan::Structured { format, prompt, fallback_prompt } => {
                match self.generator.generate(&prompt, system, GenerateOptions::unload_after()).await {
                    Ok(answer) => answer,
                    Err(e) if e.is_connection() => e.to_markdown(),
                    Err(e) => {
                        warn!(?format, error = %e, "structured generation failed; falling back to plain RAG");
                        match self.generator.generate(&fallback_prompt, system, GenerateOptions::default()).await {
                            Ok(answer) => answer,
                            Err(e) => e.to_markdown(),
                        }
                    }
                }
            }
            GenerationPlan::Reflective { prompt } => match self.generator.generate(&prompt, system, GenerateOptions::default()).await {
                Ok(initial) => self.reflection.refine(question, &initial, context).await,
                Err(e) => e.to_markdown(),
            },
        }
    }
}
