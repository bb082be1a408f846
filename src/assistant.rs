use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    ai::{prompt, AiError, ChatCompletion, ChatMessage, ChatResponse, CompletionRequest},
    config::AiConfig,
    mentor::SkillLevel,
    metrics::remote_call::{Outcome, RemoteCallMetrics},
    resilience::{ExecuteError, ResilientExecutor, Retryable},
};

pub type AssistantResult = Result<ChatResponse, ExecuteError<AiError>>;

/// The chat and mentor features, each one resilient remote call.
#[derive(Debug)]
pub struct Assistant<C> {
    client: C,
    executor: ResilientExecutor,
    config: Arc<AiConfig>,
    metrics: RemoteCallMetrics,
}

impl<C> Assistant<C>
where
    C: ChatCompletion + Send + Sync,
{
    pub fn new(client: C, executor: ResilientExecutor, config: Arc<AiConfig>, metrics: RemoteCallMetrics) -> Self {
        Self {
            client,
            executor,
            config,
            metrics,
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Forwards a conversation, optionally framed by a topic expert prompt.
    #[tracing::instrument(skip(self, messages, cancel), fields(messages = messages.len()))]
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        model: Option<&str>,
        focus: Option<(&str, SkillLevel)>,
        cancel: &CancellationToken,
    ) -> AssistantResult {
        let messages = match focus {
            Some((topic, level)) => std::iter::once(ChatMessage::system(prompt::contextual_prompt(topic, level)))
                .chain(messages)
                .collect::<Vec<_>>(),
            None => messages,
        };

        self.complete(self.config.completion_request(model, messages), cancel).await
    }

    #[tracing::instrument(skip(self, query, context, cancel))]
    pub async fn mentor(&self, query: &str, context: &str, level: SkillLevel, cancel: &CancellationToken) -> AssistantResult {
        let messages = prompt::mentor(query, context, level);
        self.complete(self.config.completion_request(None, messages), cancel).await
    }

    #[tracing::instrument(skip(self, progress, question, cancel))]
    pub async fn lab_guidance(
        &self,
        lab_name: &str,
        progress: &str,
        question: Option<&str>,
        cancel: &CancellationToken,
    ) -> AssistantResult {
        let messages = prompt::lab_guidance(lab_name, progress, question);
        self.complete(self.config.completion_request(None, messages), cancel).await
    }

    #[tracing::instrument(skip(self, code, cancel))]
    pub async fn code_review(&self, code: &str, language: &str, cancel: &CancellationToken) -> AssistantResult {
        let messages = prompt::code_review(code, language);
        self.complete(self.config.completion_request(None, messages), cancel).await
    }

    async fn complete(&self, request: CompletionRequest, cancel: &CancellationToken) -> AssistantResult {
        let client = &self.client;
        let metrics = &self.metrics;

        let result = self
            .executor
            .execute_with_cancel(
                move || {
                    let attempt = client.complete(request.clone());
                    async move {
                        let result = attempt.await;
                        metrics.record_attempt(match &result {
                            Ok(_) => Outcome::Success,
                            Err(err) => err.kind().into(),
                        });
                        result
                    }
                },
                cancel,
            )
            .await;

        match &result {
            Ok(_) => tracing::debug!("chat completion succeeded"),
            Err(ExecuteError::Operation(err)) => {
                self.metrics.record_failed_call();
                tracing::error!("chat completion failed: {err}");
            },
            Err(ExecuteError::Cancelled) => tracing::info!("chat completion cancelled"),
        }

        result
    }
}
