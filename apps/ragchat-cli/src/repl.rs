//! Command parsing and text rendering for the interactive session.

use ragchat_core::history::ConversationHistory;

pub const HISTORY_PAGE_SIZE: usize = 5;

pub const HELP_TEXT: &str = "\
Available commands:
  /help           Show this help message
  /exit           Exit the chatbot
  /clear          Clear the conversation history
  /history        Show conversation history
  /next, /prev    Page through the conversation history
  /info           Show system information
  /about          About this application
  /models         List available models
  /model <name>   Switch to a different model

Example questions:
  - What is continuous integration?
  - Explain the difference between DevOps and DevSecOps
  - What are the benefits of microservices architecture?
  - How does containerization improve software deployment?";

pub const ABOUT_TEXT: &str = "\
ragchat answers questions about your lecture notes. Retrieval combines a keyword \
index with a vector store, and answers come from a local model served by Ollama, \
so nothing leaves your machine.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Help,
    Exit,
    Clear,
    History,
    NextPage,
    PrevPage,
    Info,
    About,
    Models,
    /// Empty when the user gave no model name.
    Model(String),
    Ask(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let input = line.trim();
        let lower = input.to_lowercase();
        match lower.as_str() {
            "" => Self::Empty,
            "/help" => Self::Help,
            "/exit" | "/quit" => Self::Exit,
            "/clear" => Self::Clear,
            "/history" => Self::History,
            "/next" => Self::NextPage,
            "/prev" => Self::PrevPage,
            "/info" => Self::Info,
            "/about" => Self::About,
            "/models" => Self::Models,
            "/model" => Self::Model(String::new()),
            _ if lower.starts_with("/model ") => Self::Model(input.get("/model ".len()..).unwrap_or_default().trim().to_string()),
            _ => Self::Ask(input.to_string()),
        }
    }
}

/// Current history page; 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPager {
    page: usize,
}

impl Default for HistoryPager {
    fn default() -> Self { Self { page: 1 } }
}

impl HistoryPager {
    pub fn page(&self) -> usize { self.page }

    pub fn first(&mut self) { self.page = 1; }

    pub fn next(&mut self, history: &ConversationHistory) {
        self.page = (self.page + 1).min(history.page_count(HISTORY_PAGE_SIZE).max(1));
    }

    pub fn prev(&mut self) { self.page = self.page.saturating_sub(1).max(1); }

    pub fn render(&self, history: &ConversationHistory) -> String {
        if history.is_empty() {
            return "You haven't asked any questions yet.".to_string();
        }
        let total = history.page_count(HISTORY_PAGE_SIZE);
        let page = self.page.min(total);
        let mut out = format!(
            "Conversation History (Page {page}/{total}, keeping the last {} turns)\n",
            history.capacity()
        );
        let first = (page - 1) * HISTORY_PAGE_SIZE + 1;
        for (offset, turn) in history.page(page, HISTORY_PAGE_SIZE).into_iter().enumerate() {
            out.push_str(&format!("\n[{}] Q: {}\n    A: {}\n", first + offset, turn.question, turn.answer));
        }
        if total > 1 {
            let mut controls = String::new();
            if page > 1 {
                controls.push_str("/prev ");
            }
            controls.push_str(&format!("Page {page}/{total}"));
            if page < total {
                controls.push_str(" /next");
            }
            out.push('\n');
            out.push_str(&controls);
        }
        out
    }
}
