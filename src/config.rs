use std::time::Duration;

use crate::{ai::{ChatMessage, CompletionRequest}, cli::Cli};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Clone, Debug, PartialEq)]
pub struct ModelConfig {
    pub id: &'static str,
    pub name: &'static str,
    pub max_tokens: u32,
    pub temperature: f32,
    pub description: &'static str,
}

pub const MODELS: [ModelConfig; 3] = [
    ModelConfig {
        id: "gemini-2.0-flash",
        name: "Gemini 2.0 Flash",
        max_tokens: 1000,
        temperature: 0.7,
        description: "Fast and efficient Gemini model for general cybersecurity guidance",
    },
    ModelConfig {
        id: "gemini-2.0-pro",
        name: "Gemini 2.0 Pro",
        max_tokens: 2000,
        temperature: 0.7,
        description: "Advanced Gemini model for complex security analysis",
    },
    ModelConfig {
        id: "gemini-1.5-flash",
        name: "Gemini 1.5 Flash",
        max_tokens: 1000,
        temperature: 0.7,
        description: "Fast Gemini model with good reasoning capabilities",
    },
];

const FALLBACK_MAX_TOKENS: u32 = 1000;
const FALLBACK_TEMPERATURE: f32 = 0.7;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Gemini API key is required")]
    MissingApiKey,
    #[error("Default model is required")]
    MissingDefaultModel,
    #[error("Default model configuration not found")]
    UnknownDefaultModel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub min_interval: Duration,
    pub timeout: Duration,
    pub jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            min_interval: Duration::from_millis(1000),
            timeout: Duration::from_millis(30_000),
            jitter: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    pub environment: String,
    pub retry: RetrySettings,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            environment: "development".to_string(),
            retry: RetrySettings::default(),
        }
    }
}

impl From<&Cli> for AiConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            api_key: cli.api_key.clone().filter(|key| !key.trim().is_empty()),
            base_url: cli.base_url.clone(),
            default_model: cli.default_model.clone(),
            environment: cli.environment.clone(),
            retry: RetrySettings {
                max_retries: cli.max_retries,
                base_delay: Duration::from_millis(cli.base_delay_ms),
                min_interval: Duration::from_millis(cli.min_interval_ms),
                timeout: Duration::from_millis(cli.timeout_ms),
                jitter: cli.backoff_jitter,
            },
        }
    }
}

impl AiConfig {
    pub fn model_config(&self, model: &str) -> Option<&'static ModelConfig> {
        MODELS.iter().find(|config| config.id == model)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !self.has_api_key() {
            errors.push(ConfigError::MissingApiKey);
        }

        if self.default_model.is_empty() {
            errors.push(ConfigError::MissingDefaultModel);
        }

        if self.model_config(&self.default_model).is_none() {
            errors.push(ConfigError::UnknownDefaultModel);
        }

        errors
    }

    /// Builds a request for `model`, or the default model when unset.
    ///
    /// Models missing from the table keep their name but borrow the default
    /// model's sampling settings.
    pub fn completion_request(&self, model: Option<&str>, messages: Vec<ChatMessage>) -> CompletionRequest {
        let model = model.filter(|model| !model.is_empty()).unwrap_or(&self.default_model);
        let (max_tokens, temperature) = self
            .model_config(model)
            .or_else(|| self.model_config(&self.default_model))
            .map_or((FALLBACK_MAX_TOKENS, FALLBACK_TEMPERATURE), |config| (config.max_tokens, config.temperature));

        CompletionRequest {
            model: model.to_string(),
            messages,
            max_tokens,
            temperature,
        }
    }
}
