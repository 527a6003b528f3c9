//! Prompt text and context rendering.

use ragchat_core::types::{RetrievalMethod, RetrievedDocument};

/// Fixed answer when retrieval produced nothing.
pub const NO_CONTEXT_MESSAGE: &str =
    "No relevant context information was found in the documents to answer this question.";

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an educational assistant for a university software engineering course.
Everything you know comes from the course lecture notes supplied as context.

When you answer:
- Lead with a direct, concise answer, then expand with structure (headings, bullet points).
- Use precise academic terminology while staying accessible to students.
- Cite the lecture document and page or slide you draw from.
- Format code and technical terms as code.
- Break complex topics into ordered, logical steps.

If the notes do not contain enough information, say so plainly and suggest related
topics the notes do cover. Never invent facts that are not in the context.";

/// Criteria the reflection pass checks the first answer against.
pub const EVALUATION_CRITERIA: [(&str, &str); 6] = [
    ("Accuracy", "Does the response accurately reflect the information in the context?"),
    ("Completeness", "Does it address every part of the question?"),
    ("Clarity", "Is the explanation clear and well structured?"),
    ("Precision", "Is academic terminology used correctly?"),
    ("Evidence", "Are claims supported with references to the lecture content?"),
    ("Citation", "Are sources and page/slide numbers cited wherever context is used (e.g. Document 1: notes.pdf, Page 3)?"),
];

pub const IMPROVED_ANSWER_MARKER: &str = "## Improved Answer";
pub const SELF_REFLECTION_MARKER: &str = "## Self-Reflection";

/// Layout requested for comparative and procedural questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredFormat {
    Comparison,
    Steps,
}

impl StructuredFormat {
    pub fn instructions(&self) -> &'static str {
        match self {
            Self::Comparison => "\
Format your response as a comparison between the concepts:
## Concept A
- Key characteristics
- Advantages
- Disadvantages

## Concept B
- Key characteristics
- Advantages
- Disadvantages

## Comparison
| Aspect | Concept A | Concept B |
| ------ | --------- | --------- |
| Aspect 1 | Value for A | Value for B |
| ... | ... | ... |",
            Self::Steps => "\
Format your response as a step-by-step guide:
## Process Overview
A brief overview of the process

## Step 1: [Step Name]
Explanation of step 1

## Step 2: [Step Name]
Explanation of step 2

Continue with clearly numbered steps and explanations.",
        }
    }
}

pub struct FewShotExample {
    pub question: &'static str,
    pub answer: &'static str,
}

pub static FEW_SHOT_EXAMPLES: [FewShotExample; 2] = [
    FewShotExample {
        question: "What is continuous integration?",
        answer: "\
## Continuous Integration

Continuous Integration (CI) is a development practice in which developers merge their changes into a shared repository several times a day, and every merge triggers an automated build and test run.

Key benefits:
- Integration problems surface early
- Merges stay small and simple
- Releases can happen more often
- Automated tests keep code quality up

According to Document 2: devops.pdf, Page 4, CI is the first stage of an automated delivery pipeline and is commonly run with tools such as Jenkins, GitHub Actions or GitLab CI.",
    },
    FewShotExample {
        question: "Explain the difference between microservices and monolithic architecture.",
        answer: "\
## Microservices vs. Monolithic Architecture

### Monolithic Architecture
- **Structure**: one codebase and one deployment unit
- **Coupling**: components are tightly coupled
- **Deployment**: any change redeploys the whole application
- **Scaling**: the application scales as a single unit

### Microservices Architecture
- **Structure**: many small services, each deployable on its own
- **Coupling**: loose coupling through defined interfaces
- **Deployment**: services ship independently
- **Scaling**: each service scales with its own demand

According to Document 1: architecture.pdf, Slide 12, teams often start with a monolith and move to microservices as the system and organisation grow.",
    },
];

const EXAMPLE_TRIGGERS: &[&str] = &[
    "compare", "explain", "analyze", "evaluate", "why",
    "how does", "implications", "relationship between",
];

const EXAMPLE_MIN_CHARS: usize = 100;

/// Whether a question is involved enough that a worked example helps steer the format.
pub fn wants_example(question: &str) -> bool {
    if question.chars().count() > EXAMPLE_MIN_CHARS {
        return true;
    }
    let lower = question.to_lowercase();
    EXAMPLE_TRIGGERS.iter().any(|t| lower.contains(t))
}

/// Render context documents as numbered sections. Vector results also carry
/// their similarity; lexical scores are not shown since they have no fixed scale.
pub fn format_context(docs: &[RetrievedDocument]) -> String {
    if docs.is_empty() {
        return NO_CONTEXT_MESSAGE.to_string();
    }
    let sections: Vec<String> = docs
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let relevance = match (doc.retrieval_method, doc.score) {
                (RetrievalMethod::Vector, Some(similarity)) => format!(" [Relevance: {similarity:.2}]"),
                _ => String::new(),
            };
            format!(
                "[DOCUMENT {}]: {} (Page/Slide: {}){}\n{}",
                i + 1,
                doc.chunk.source,
                doc.chunk.locator,
                relevance,
                doc.chunk.content.trim()
            )
        })
        .collect();
    format!("\n\n{}", sections.join("\n\n"))
}

pub fn rag_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a university-level educational assistant. You will receive context extracted \
from lecture notes and a question from a student.

CONTEXT INFORMATION:
{context}

USER QUESTION:
{question}

To answer effectively:
1. Work out what the question is asking.
2. Pick the parts of the context that are relevant.
3. Explain the concepts step by step.
4. Address likely misconceptions.
5. Give a clear, structured response that answers the question directly.

Response format:
---
## [Direct answer to the question]
[Detailed explanation with structured formatting]

[Examples or elaboration as needed]
---

Important: Answer based *only* on the provided context. If the answer cannot be found in the \
context, reply exactly: '{NO_CONTEXT_MESSAGE}' \
When using information from the context, cite the document and page/slide number \
(e.g. Document 1: filename.pdf, Page 3).
"
    )
}

pub fn structured_prompt(question: &str, context: &str, format: StructuredFormat) -> String {
    format!(
        "You are a university-level educational assistant.

Based on the following context information from the lecture notes:
{context}

Please answer this question:
{question}

{instructions}

Important: Answer based *only* on the provided context. If the answer cannot be found in the \
context, reply exactly: '{NO_CONTEXT_MESSAGE}'
Cite the specific document and page/slide number when using the context \
(e.g. \"According to Document 1: lecture_notes.pdf, Page 5...\").
Be concise but comprehensive.
",
        instructions = format.instructions()
    )
}

pub fn reflection_prompt(question: &str, initial_answer: &str, context: &str) -> String {
    let criteria: Vec<String> = EVALUATION_CRITERIA.iter().map(|(name, check)| format!("- {name}: {check}")).collect();
    format!(
        "You are an educational assistant reviewing your previous response to make sure it meets \
high academic standards.

Original question: {question}

Your previous response:
{initial_answer}

Reflect on your response using these criteria:
{criteria}

First identify any issues with the previous response, including missing citations.
Then write an improved version that fixes them. Base the improved answer strictly on this context:

{context}

Important: the improved answer must use *only* the provided context. If the answer is not in the \
context, reply exactly: '{NO_CONTEXT_MESSAGE}' Cite document and \
page/slide number for everything taken from the context.

Begin your response with \"{SELF_REFLECTION_MARKER}\" followed by your analysis, then \
\"{IMPROVED_ANSWER_MARKER}\" with your revised response.
",
        criteria = criteria.join("\n")
    )
}

/// Append a worked example to `prompt`.
pub fn with_example(prompt: &str, example: &FewShotExample) -> String {
    format!(
        "{prompt}
Here's an example of how to answer a similar question:

EXAMPLE QUESTION: {}

EXAMPLE ANSWER: {}

Now answer the original question following a similar format and approach:
",
        example.question, example.answer
    )
}
