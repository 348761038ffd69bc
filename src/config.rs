//! Process-wide configuration, read once at startup.
//!
//! [`AppConfig::from_env`] is the only place environment variables are read;
//! everything downstream receives the values it needs by reference.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid number in {var}: {value}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("unsupported LLM provider: {0} (expected gemini or groq)")]
    UnsupportedProvider(String),
}

/// Configuration for the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_base: String,
    pub embedding_model: String,
    pub generate_model: String,
}

/// Configuration for an OpenAI-compatible chat endpoint (Groq)
#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Gemini,
    Groq,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(LlmProvider::Gemini),
            "groq" => Ok(LlmProvider::Groq),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Timeouts and caching for the generation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub embed_timeout: Duration,
    pub llm_timeout: Duration,
    /// How long a built index may be reused; zero disables reuse
    pub index_cache_ttl: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            embed_timeout: Duration::from_secs(30),
            llm_timeout: Duration::from_secs(120),
            index_cache_ttl: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub cors_allowed_origin: String,
    pub llm_provider: LlmProvider,
    pub gemini: GeminiConfig,
    pub groq: Option<GroqConfig>,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Create a new configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::MissingVar(key));
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let seconds = |key: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match get(key) {
                None => Ok(Duration::from_secs(default)),
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::InvalidNumber { var: key, value }),
            }
        };

        let llm_provider = match get("LLM_PROVIDER") {
            Some(value) => value.parse()?,
            None => LlmProvider::Gemini,
        };

        // Embeddings always come from Gemini
        let gemini = GeminiConfig {
            api_key: required("GEMINI_API_KEY")?,
            api_base: or_default(
                "GEMINI_API_BASE",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            embedding_model: or_default("GEMINI_EMBEDDING_MODEL", "models/text-embedding-004"),
            generate_model: or_default("GEMINI_GENERATE_MODEL", "models/gemini-2.0-flash"),
        };

        let groq = match llm_provider {
            LlmProvider::Groq => Some(GroqConfig {
                api_key: required("GROQ_API_KEY")?,
                api_base: or_default("GROQ_API_BASE", "https://api.groq.com/openai"),
                model: or_default("GROQ_MODEL", "llama3-8b-8192"),
            }),
            LlmProvider::Gemini => None,
        };

        let defaults = PipelineConfig::default();
        let pipeline = PipelineConfig {
            embed_timeout: seconds("EMBED_TIMEOUT_SECS", defaults.embed_timeout.as_secs())?,
            llm_timeout: seconds("LLM_TIMEOUT_SECS", defaults.llm_timeout.as_secs())?,
            index_cache_ttl: seconds(
                "INDEX_CACHE_TTL_SECS",
                defaults.index_cache_ttl.as_secs(),
            )?,
        };

        Ok(AppConfig {
            bind_address: or_default("BIND_ADDRESS", "127.0.0.1:8000"),
            cors_allowed_origin: or_default("CORS_ALLOWED_ORIGIN", "http://localhost:3000"),
            llm_provider,
            gemini,
            groq,
            pipeline,
        })
    }
}
