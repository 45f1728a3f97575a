//! Pipeline configuration
//!
//! Loads configuration from YAML or from environment variables and provides
//! strongly-typed access to the dictionary, model and pipeline settings.
//!
//! Secrets never live in the file: `model.api_key_env` names the environment
//! variable that holds the model API key.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GlossError, Result};

/// Hard upper bound on words per model call
pub const MAX_CHUNK_SIZE: usize = 20;

const DEFAULT_DICTIONARY_URL: &str = "https://v2.xxapi.cn/api/englishwords";
const DEFAULT_USER_AGENT: &str = "xiaoxiaoapi/1.0.0 (https://xxapi.cn)";
const DEFAULT_MODEL_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";
const DEFAULT_MODEL: &str = "doubao-seed-1-6-flash-250615";
const DEFAULT_API_KEY_ENV: &str = "ARK_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GlossConfig {
    #[serde(default)]
    pub dictionary: DictionaryConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Primary dictionary service settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DictionaryConfig {
    #[serde(default = "default_dictionary_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_dictionary_timeout")]
    pub timeout_secs: u64,
}

/// Generative model (OpenAI-compatible) settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Ask the endpoint for `response_format: json_object`
    #[serde(default)]
    pub json_mode: bool,
    /// Language the meanings are written in
    #[serde(default = "default_target_language")]
    pub target_language: String,
}

/// What to do with words the model left out of an otherwise valid reply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OmittedWordPolicy {
    /// Give the word a "no gloss returned" placeholder
    #[default]
    Placeholder,
    /// Send omitted words through one more batch pass before giving up
    RetryOnce,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Concurrent dictionary lookups (1 = sequential)
    #[serde(default = "default_lookup_concurrency")]
    pub lookup_concurrency: usize,
    #[serde(default)]
    pub omitted_word_policy: OmittedWordPolicy,
}

fn default_dictionary_url() -> String {
    DEFAULT_DICTIONARY_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_dictionary_timeout() -> u64 {
    30
}

fn default_model_url() -> String {
    DEFAULT_MODEL_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_model_timeout() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.1
}

fn default_target_language() -> String {
    "Simplified Chinese".to_string()
}

fn default_chunk_size() -> usize {
    MAX_CHUNK_SIZE
}

fn default_lookup_concurrency() -> usize {
    1
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            base_url: default_dictionary_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_dictionary_timeout(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_model_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_model_timeout(),
            temperature: default_temperature(),
            json_mode: false,
            target_language: default_target_language(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            lookup_concurrency: default_lookup_concurrency(),
            omitted_word_policy: OmittedWordPolicy::default(),
        }
    }
}

impl DictionaryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).map_err(|_| {
            GlossError::Config(format!(
                "{} environment variable not set",
                self.api_key_env
            ))
        })
    }
}

impl GlossConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GlossError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: GlossConfig = serde_yaml::from_str(content)
            .map_err(|e| GlossError::Config(format!("invalid YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `GLOSS_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `GLOSS_*` environment variables on top of the current values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("GLOSS_DICTIONARY_URL") {
            self.dictionary.base_url = url;
        }
        if let Ok(url) = std::env::var("GLOSS_MODEL_URL") {
            self.model.base_url = url;
        }
        if let Ok(model) = std::env::var("GLOSS_MODEL") {
            self.model.model = model;
        }
        if let Ok(size) = std::env::var("GLOSS_CHUNK_SIZE") {
            self.pipeline.chunk_size = size.parse().map_err(|_| {
                GlossError::Config(format!("GLOSS_CHUNK_SIZE is not a number: {}", size))
            })?;
        }
        if let Ok(n) = std::env::var("GLOSS_LOOKUP_CONCURRENCY") {
            self.pipeline.lookup_concurrency = n.parse().map_err(|_| {
                GlossError::Config(format!("GLOSS_LOOKUP_CONCURRENCY is not a number: {}", n))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.chunk_size == 0 || self.pipeline.chunk_size > MAX_CHUNK_SIZE {
            return Err(GlossError::Config(format!(
                "chunk_size must be between 1 and {}, got {}",
                MAX_CHUNK_SIZE, self.pipeline.chunk_size
            )));
        }
        if self.pipeline.lookup_concurrency == 0 {
            return Err(GlossError::Config(
                "lookup_concurrency must be at least 1".to_string(),
            ));
        }
        url::Url::parse(&self.dictionary.base_url).map_err(|e| {
            GlossError::Config(format!(
                "invalid dictionary base_url '{}': {}",
                self.dictionary.base_url, e
            ))
        })?;
        url::Url::parse(&self.model.base_url).map_err(|e| {
            GlossError::Config(format!(
                "invalid model base_url '{}': {}",
                self.model.base_url, e
            ))
        })?;
        Ok(())
    }
}
