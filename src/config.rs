use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_GENERATION_MAX_TOKENS: u32 = 512;
const DEFAULT_NORMALIZATION_MAX_ATTEMPTS: usize = 3;
const DEFAULT_MATCH_TOP_K: usize = 5;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Rusty Match pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the Ollama runtime serving both generation and embeddings.
    pub ollama_url: String,
    /// Text-generation model used for field extraction and explanations.
    pub generation_model: String,
    /// Upper bound on tokens produced per generation call.
    pub generation_max_tokens: u32,
    /// Total normalization attempts per document, including the first.
    pub normalization_max_attempts: usize,
    /// Embedding provider used to vectorize canonical records.
    pub embedding_provider: EmbeddingProvider,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Dimensionality of the produced vectors, required by the hashing provider.
    pub embedding_dimension: Option<usize>,
    /// Default number of matches returned per query.
    pub match_top_k: usize,
}

/// Supported embedding backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local Ollama runtime.
    Ollama,
    /// Deterministic in-process hashing embeddings (offline runs and tests).
    Hashing,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let embedding_provider: EmbeddingProvider = load_env("EMBEDDING_PROVIDER")?
            .parse()
            .map_err(|()| ConfigError::InvalidValue("EMBEDDING_PROVIDER".to_string()))?;
        let embedding_dimension = parse_optional::<usize>("EMBEDDING_DIMENSION")?;
        if embedding_provider == EmbeddingProvider::Hashing && embedding_dimension.is_none() {
            return Err(ConfigError::MissingVariable(
                "EMBEDDING_DIMENSION".to_string(),
            ));
        }

        let normalization_max_attempts = parse_optional::<usize>("NORMALIZATION_MAX_ATTEMPTS")?
            .unwrap_or(DEFAULT_NORMALIZATION_MAX_ATTEMPTS);
        if normalization_max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "NORMALIZATION_MAX_ATTEMPTS".to_string(),
            ));
        }

        Ok(Self {
            ollama_url: load_env_optional("OLLAMA_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            generation_model: load_env("GENERATION_MODEL")?,
            generation_max_tokens: parse_optional("GENERATION_MAX_TOKENS")?
                .unwrap_or(DEFAULT_GENERATION_MAX_TOKENS),
            normalization_max_attempts,
            embedding_provider,
            embedding_model: load_env("EMBEDDING_MODEL")?,
            embedding_dimension,
            match_top_k: parse_optional("MATCH_TOP_K")?.unwrap_or(DEFAULT_MATCH_TOP_K),
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    load_env_optional(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "hashing" => Ok(Self::Hashing),
            _ => Err(()),
        }
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        ollama_url = %config.ollama_url,
        generation_model = %config.generation_model,
        embedding_provider = ?config.embedding_provider,
        embedding_model = %config.embedding_model,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
