use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

/// Bounded, insertion-ordered conversation log. When full, the oldest turn is
/// evicted before the new one is appended.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationHistory {
    pub fn new(capacity: usize) -> Self {
        Self { turns: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.turns.len() >= self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(Turn { question: question.into(), answer: answer.into() });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> { self.turns.iter() }

    pub fn len(&self) -> usize { self.turns.len() }

    pub fn is_empty(&self) -> bool { self.turns.is_empty() }

    pub fn capacity(&self) -> usize { self.capacity }

    pub fn clear(&mut self) { self.turns.clear(); }

    /// Number of pages of `per_page` turns; zero when empty.
    pub fn page_count(&self, per_page: usize) -> usize { self.turns.len().div_ceil(per_page.max(1)) }

    /// Turns on 1-based `page`, oldest first. Out-of-range pages are empty.
    pub fn page(&self, page: usize, per_page: usize) -> Vec<&Turn> {
        let per_page = per_page.max(1);
        self.turns.iter().skip(page.saturating_sub(1) * per_page).take(per_page).collect()
    }
}
