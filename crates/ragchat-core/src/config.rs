//! Settings loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `RAGCHAT_*` env vars into one validated [`Settings`] value that is
//! passed to each component at construction.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Prefix for environment overrides. Nested keys use `__`,
/// e.g. `RAGCHAT_GENERATION__MAX_RETRIES=2`.
pub const ENV_PREFIX: &str = "RAGCHAT_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: String,
    pub processed_dir: String,
    pub db_dir: String,
    /// Generation model identifier as known to the generation service.
    pub model: String,
    /// Base URL of the generation service.
    pub ollama_url: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub history_capacity: usize,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Ollama,
    /// Deterministic hashing embedder; no network, for tests and offline runs.
    Fake,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub batch_size: usize,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Whether the active model is strong enough to benefit from a reflection pass.
    pub supports_reflection: bool,
    pub min_reflection_chars: usize,
    /// Upper bound on prompt size before the few-shot example is dropped.
    pub prompt_budget_chars: usize,
    pub system_prompt: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            processed_dir: "processed".to_string(),
            db_dir: "vector_db".to_string(),
            model: "mistral:7b-instruct-v0.3-q4_1".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            history_capacity: 10,
            embedding: EmbeddingSettings::default(),
            generation: GenerationSettings::default(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Ollama,
            model: "nomic-embed-text".to_string(),
            dimension: 768,
            batch_size: 32,
            table: "lecture_notes".to_string(),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            max_retries: 0,
            supports_reflection: true,
            min_reflection_chars: 200,
            prompt_budget_chars: 6000,
            system_prompt: None,
        }
    }
}

impl Settings {
    /// Load `config.toml` + `config.<env>.toml` + `RAGCHAT_*` env vars over the
    /// built-in defaults, then validate. Any failure here is fatal at startup.
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::from_figment(Self::figment_for_env(&env_name))
    }

    pub fn figment_for_env(env_name: &str) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be greater than zero".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be greater than zero".to_string()));
        }
        if self.history_capacity == 0 {
            return Err(Error::InvalidConfig("history_capacity must be greater than zero".to_string()));
        }
        if self.embedding.dimension == 0 {
            return Err(Error::InvalidConfig("embedding.dimension must be greater than zero".to_string()));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be greater than zero".to_string()));
        }
        if !(self.ollama_url.starts_with("http://") || self.ollama_url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!("ollama_url '{}' must be an http(s) URL", self.ollama_url)));
        }
        Ok(())
    }

    pub fn data_path(&self) -> PathBuf { expand_path(&self.data_dir) }

    pub fn processed_path(&self) -> PathBuf { expand_path(&self.processed_dir) }

    pub fn db_path(&self) -> PathBuf { expand_path(&self.db_dir) }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
