//! Ollama generation client with retry

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use ragchat_core::config::Settings;

use crate::error::GenerationError;

/// Per-call knobs forwarded to the service.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerateOptions {
    /// Seconds the model stays loaded after the call; `Some(0)` unloads it right away.
    pub keep_alive: Option<i64>,
}

impl GenerateOptions {
    /// For heavy one-off calls (structured, reflection): unload the model afterwards.
    pub fn unload_after() -> Self { Self { keep_alive: Some(0) } }
}

/// Synchronous, non-streaming text generation.
#[async_trait]
pub trait Generator: Send + Sync {
    fn model(&self) -> String;
    async fn generate(&self, prompt: &str, system: Option<&str>, options: GenerateOptions) -> Result<String, GenerationError>;
}

pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: RwLock<String>,
    max_retries: u32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: String,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<i64>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration, max_retries: u32) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| GenerationError::Client(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: RwLock::new(model.to_string()),
            max_retries,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, GenerationError> {
        Self::new(
            &settings.ollama_url,
            &settings.model,
            Duration::from_secs(settings.generation.timeout_secs),
            settings.generation.max_retries,
        )
    }

    pub fn set_model(&self, model: &str) {
        let mut guard = self.model.write().unwrap_or_else(|p| p.into_inner());
        *guard = model.to_string();
    }

    /// Retry a request with exponential backoff. Only retryable failures are retried.
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T, GenerationError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, GenerationError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = Duration::from_secs(2u64.pow(attempt));
                    warn!(
                        "Request failed (attempt {}/{}): {}; retrying in {:?}",
                        attempt + 1,
                        self.max_retries + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn connection_error(&self, e: &reqwest::Error) -> GenerationError {
        if e.is_connect() {
            GenerationError::Connection { url: self.base_url.clone(), message: e.to_string() }
        } else {
            GenerationError::Client(e.to_string())
        }
    }

    /// Check if the service answers at all.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Names of the models installed on the service.
    pub async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| self.connection_error(&e))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }
        let tags: TagsResponse = response.json().await.map_err(|e| GenerationError::Decode(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Log whether the service is up and the configured model is installed.
    /// Returns `true` only when both hold.
    pub async fn check_availability(&self) -> bool {
        let model = self.model();
        match self.list_models().await {
            Ok(models) if models.is_empty() => {
                warn!("No models found in Ollama");
                false
            }
            Ok(models) if !models.contains(&model) => {
                warn!(model = %model, available = %models.join(", "), "model not found; pull it with `ollama pull <model>`");
                false
            }
            Ok(_) => {
                info!(model = %model, "connected to Ollama");
                true
            }
            Err(e) if e.is_connection() => {
                error!(url = %self.base_url, "cannot connect to Ollama; is it running?");
                false
            }
            Err(e) => {
                error!(error = %e, "error checking Ollama availability");
                false
            }
        }
    }
}

#[async_trait]
impl Generator for OllamaClient {
    fn model(&self) -> String { self.model.read().map(|m| m.clone()).unwrap_or_else(|p| p.into_inner().clone()) }

    async fn generate(&self, prompt: &str, system: Option<&str>, options: GenerateOptions) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.base_url);
        let model = self.model();
        info!(model = %model, prompt_chars = prompt.len(), "generating");

        self.retry_request(|| {
            let request = GenerateRequest {
                model: model.clone(),
                prompt,
                stream: false,
                system,
                keep_alive: options.keep_alive,
            };
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| self.connection_error(&e))?;

                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    error!(status, %body, "Ollama API error");
                    return Err(GenerationError::Status { status, body });
                }

                let generate_response: GenerateResponse = response
                    .json()
                    .await
                    .map_err(|e| GenerationError::Decode(e.to_string()))?;

                Ok(generate_response.response)
            }
        })
        .await
    }
}
