use serde::{Deserialize, Serialize};

use crate::resilience::{ErrorKind, Retryable};

pub mod client;
pub mod prompt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub role: Role,
}

impl ChatResponse {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: Role::Assistant,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("Gemini API key is required")]
    MissingApiKey,
    #[error("chat completion API error: {status} {reason}")]
    Status { status: u16, reason: String },
    #[error("failed to reach chat completion API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed chat completion response: {0}")]
    MalformedResponse(String),
}

impl Retryable for AiError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingApiKey => ErrorKind::Permanent,
            Self::Status { status: 429, .. } => ErrorKind::RateLimited,
            Self::Status { status, .. } if *status == 408 || *status >= 500 => ErrorKind::Transient,
            Self::Status { .. } => ErrorKind::Permanent,
            Self::Transport(_) | Self::MalformedResponse(_) => ErrorKind::Transient,
        }
    }
}

/// One round trip to a chat completion endpoint.
#[cfg_attr(test, mockall::automock)]
pub trait ChatCompletion {
    fn complete(&self, request: CompletionRequest) -> impl Future<Output = Result<ChatResponse, AiError>> + Send;
}
