//! Text-generation backends used for field extraction and match explanations.
//!
//! The pipeline treats the model as a prompt-in/text-out black box. The Ollama-backed client
//! mirrors the embedding adapter by issuing HTTP requests directly to the runtime; tests and
//! offline runs substitute their own [`TextGenerator`] implementations.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Stop sequence that ends generation right after the extracted object closes.
pub const OBJECT_STOP_SEQUENCE: &str = "\n}";

/// Errors surfaced while calling a text-generation backend.
#[derive(Debug, Error)]
pub enum GenerationClientError {
    /// Provider was unreachable.
    #[error("Generation provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate text: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Decoding options passed with every generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature; `0.0` requests deterministic decoding.
    pub temperature: f32,
    /// Sequences that terminate generation as soon as they are produced.
    pub stop: Vec<String>,
    /// Upper bound on produced tokens.
    pub max_output_tokens: u32,
}

impl GenerationOptions {
    /// Options for structured extraction: greedy decoding, stop at the closing brace.
    ///
    /// The stop sequence is consumed by the backend, so successful outputs usually lack their
    /// final `}` and rely on brace repair in [`crate::normalization::recovery`].
    pub fn normalization(max_output_tokens: u32) -> Self {
        Self {
            temperature: 0.0,
            stop: vec![OBJECT_STOP_SEQUENCE.to_string()],
            max_output_tokens,
        }
    }

    /// Options for free-form match explanations.
    pub fn explanation(max_output_tokens: u32) -> Self {
        Self {
            temperature: 0.0,
            stop: Vec::new(),
            max_output_tokens,
        }
    }
}

/// Interface implemented by text-generation providers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationClientError>;
}

/// Build a generation client for the supplied configuration.
pub fn get_generation_client(config: &Config) -> Box<dyn TextGenerator> {
    Box::new(OllamaGenerationClient::new(
        config.ollama_url.clone(),
        config.generation_model.clone(),
    ))
}

/// Text-generation client backed by a local Ollama runtime.
pub struct OllamaGenerationClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaGenerationClient {
    /// Construct a client targeting `base_url` with the given model.
    pub fn new(base_url: String, model: String) -> Self {
        let http = Client::builder()
            .user_agent("rustymatch/generate")
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl TextGenerator for OllamaGenerationClient {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationClientError> {
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": options.temperature,
                "stop": options.stop,
                "num_predict": options.max_output_tokens,
            }
        });

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            max_output_tokens = options.max_output_tokens,
            "Requesting generation"
        );

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GenerationClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            GenerationClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(GenerationClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response)
    }
}
