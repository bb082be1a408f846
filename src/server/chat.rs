use std::sync::Arc;

use axum::{extract::{rejection::JsonRejection, State}, Json};
use serde_json::Value;

use crate::{
    ai::{ChatCompletion, ChatMessage, ChatResponse},
    mentor::SkillLevel,
    server::{error::ApiError, AppState},
};

#[derive(Debug, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub topic: Option<String>,
    pub skill_level: SkillLevel,
}

impl TryFrom<Value> for ChatRequest {
    type Error = ApiError;

    fn try_from(body: Value) -> Result<Self, Self::Error> {
        let invalid_messages = || ApiError::BadRequest("Invalid messages format".to_string());
        let invalid_message = || ApiError::BadRequest("Invalid message format".to_string());

        let messages = body
            .get("messages")
            .and_then(Value::as_array)
            .ok_or_else(invalid_messages)?
            .iter()
            .map(|message| {
                serde_json::from_value::<ChatMessage>(message.clone())
                    .ok()
                    .filter(|message| !message.content.is_empty())
                    .ok_or_else(invalid_message)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let text = |key: &str| body.get(key).and_then(Value::as_str).filter(|value| !value.is_empty()).map(str::to_string);

        let skill_level = match body.get("skillLevel") {
            None | Some(Value::Null) => SkillLevel::default(),
            Some(value) => serde_json::from_value(value.clone()).map_err(|_| ApiError::BadRequest("Invalid skill level".to_string()))?,
        };

        Ok(Self {
            messages,
            model: text("model"),
            topic: text("topic"),
            skill_level,
        })
    }
}

#[tracing::instrument(skip_all)]
pub async fn handle<C>(
    State(state): State<Arc<AppState<C>>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError>
where
    C: ChatCompletion + Send + Sync + 'static,
{
    let Json(body) = payload?;
    let request = ChatRequest::try_from(body)?;

    tracing::info!(messages = request.messages.len(), model = ?request.model, "chat request");

    let focus = request.topic.as_deref().map(|topic| (topic, request.skill_level));
    let response = state
        .assistant
        .chat(request.messages, request.model.as_deref(), focus, &state.shutdown)
        .await?;

    Ok(Json(response))
}
