use thiserror::Error;

/// Failure of a single call to the generation service.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Cannot connect to generation service at {url}: {message}")]
    Connection { url: String, message: String },

    #[error("Generation failed: HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse generation response: {0}")]
    Decode(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl GenerationError {
    /// Connection failures and server-side (5xx) statuses may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode(_) | Self::Client(_) => false,
        }
    }

    pub fn is_connection(&self) -> bool { matches!(self, Self::Connection { .. }) }

    /// User-facing markdown block shown in place of an answer.
    pub fn to_markdown(&self) -> String {
        match self {
            Self::Connection { .. } => "# Connection Error\n\n\
                Cannot connect to Ollama. Please make sure the Ollama server is running.\n\n\
                To start Ollama:\n\
                1. Open a new terminal\n\
                2. Run the Ollama application\n\
                3. Try your question again"
                .to_string(),
            other => format!("# Error\n\n{other}\n\nPlease try again or check the logs for more information."),
        }
    }
}
