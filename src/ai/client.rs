use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ai::{AiError, ChatCompletion, ChatMessage, ChatResponse, CompletionRequest};

/// OpenAI-compatible `chat/completions` client.
#[derive(Clone, Debug)]
pub struct HttpChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl<'a> From<&'a CompletionRequest> for RequestBody<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        }
    }
}

impl ResponseBody {
    fn into_response(self) -> Result<ChatResponse, AiError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiError::MalformedResponse("no choices".to_string()))?;
        let content = choice
            .message
            .content
            .ok_or_else(|| AiError::MalformedResponse("no message content".to_string()))?;

        Ok(ChatResponse::assistant(content))
    }
}

impl HttpChatClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self, AiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl ChatCompletion for HttpChatClient {
    #[tracing::instrument(skip_all, fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<ChatResponse, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        tracing::debug!("sending chat completion request");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&RequestBody::from(&request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body: ResponseBody = response
            .json()
            .await
            .map_err(|err| AiError::MalformedResponse(err.to_string()))?;
        body.into_response()
    }
}
