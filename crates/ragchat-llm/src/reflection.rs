use std::sync::Arc;
use tracing::{debug, info, warn};

use ragchat_core::config::GenerationSettings;
use ragchat_core::types::RetrievedDocument;

use crate::client::{GenerateOptions, Generator};
use crate::prompt::{format_context, reflection_prompt, IMPROVED_ANSWER_MARKER};

/// Best-effort critique-and-rewrite pass over a first answer.
pub struct ReflectionEngine {
    generator: Arc<dyn Generator>,
    system_prompt: String,
    min_answer_chars: usize,
    enabled: bool,
}

impl ReflectionEngine {
    pub fn new(generator: Arc<dyn Generator>, system_prompt: impl Into<String>, min_answer_chars: usize, enabled: bool) -> Self {
        Self { generator, system_prompt: system_prompt.into(), min_answer_chars, enabled }
    }

    pub fn from_settings(generator: Arc<dyn Generator>, system_prompt: impl Into<String>, settings: &GenerationSettings) -> Self {
        Self::new(generator, system_prompt, settings.min_reflection_chars, settings.supports_reflection)
    }

    /// Short answers and models without the capability skip the extra call.
    pub fn should_reflect(&self, initial_answer: &str) -> bool {
        self.enabled && initial_answer.chars().count() >= self.min_answer_chars
    }

    pub async fn refine(&self, question: &str, initial_answer: &str, context: &[RetrievedDocument]) -> String {
        if !self.should_reflect(initial_answer) {
            debug!(enabled = self.enabled, chars = initial_answer.chars().count(), "skipping reflection");
            return initial_answer.to_string();
        }
        let prompt = reflection_prompt(question, initial_answer, &format_context(context));
        match self.generator.generate(&prompt, Some(self.system_prompt.as_str()), GenerateOptions::unload_after()).await {
            Ok(response) => {
                info!("reflection pass complete");
                extract_improved_answer(&response)
            }
            Err(e) => {
                warn!(error = %e, "reflection failed; keeping initial answer");
                initial_answer.to_string()
            }
        }
    }
}

/// Text after the last improved-answer marker. Without the marker, or when
/// nothing follows it, the whole response is returned.
pub fn extract_improved_answer(response: &str) -> String {
    match response.rfind(IMPROVED_ANSWER_MARKER) {
        Some(pos) => {
            let improved = response[pos + IMPROVED_ANSWER_MARKER.len()..].trim();
            if improved.is_empty() { response.trim().to_string() } else { improved.to_string() }
        }
        None => response.to_string(),
    }
}
