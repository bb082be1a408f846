use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
        State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    ai::{ChatCompletion, ChatResponse},
    mentor::{self, SkillLevel, TOPICS},
    server::{error::ApiError, AppState},
};

#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum MentorRequest {
    Mentor {
        user_query: String,
        context: Option<String>,
        #[serde(default)]
        skill_level: SkillLevel,
        topic: Option<String>,
        current_lab: Option<String>,
        progress: Option<String>,
    },
    LabGuidance {
        lab_name: String,
        user_progress: String,
        specific_question: Option<String>,
    },
    CodeReview {
        code: String,
        language: Option<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub topics: &'static [&'static str],
    pub skill_levels: [SkillLevel; 3],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPathQuery {
    pub topic: String,
    #[serde(default)]
    pub skill_level: SkillLevel,
}

#[derive(Debug, Serialize)]
pub struct LearningPath {
    pub path: &'static [&'static str],
    pub resources: &'static [&'static str],
}

fn require(field: &str, name: &str) -> Result<(), ApiError> {
    if field.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("Missing required field: {name}")));
    }

    Ok(())
}

/// Context line used when a mentor request carries none.
pub fn default_context(topic: Option<&str>, level: SkillLevel, current_lab: Option<&str>, progress: Option<&str>) -> String {
    format!(
        "Topic: {}, Skill Level: {level}, Current Lab: {}, Progress: {}",
        topic.unwrap_or("General"),
        current_lab.unwrap_or("None"),
        progress.unwrap_or("Not specified"),
    )
}

#[tracing::instrument(skip_all)]
pub async fn handle<C>(
    State(state): State<Arc<AppState<C>>>,
    payload: Result<Json<MentorRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError>
where
    C: ChatCompletion + Send + Sync + 'static,
{
    let Json(request) = payload?;
    let assistant = &state.assistant;
    let cancel = &state.shutdown;

    let response = match request {
        MentorRequest::Mentor { user_query, context, skill_level, topic, current_lab, progress } => {
            require(&user_query, "userQuery")?;
            tracing::info!(%skill_level, "mentor request");

            let context = context
                .filter(|context| !context.is_empty())
                .unwrap_or_else(|| default_context(topic.as_deref(), skill_level, current_lab.as_deref(), progress.as_deref()));
            assistant.mentor(&user_query, &context, skill_level, cancel).await?
        },
        MentorRequest::LabGuidance { lab_name, user_progress, specific_question } => {
            require(&lab_name, "labName")?;
            tracing::info!(%lab_name, "lab guidance request");

            assistant.lab_guidance(&lab_name, &user_progress, specific_question.as_deref(), cancel).await?
        },
        MentorRequest::CodeReview { code, language } => {
            require(&code, "code")?;
            let language = language.filter(|language| !language.is_empty()).unwrap_or_else(|| "python".to_string());
            tracing::info!(%language, "code review request");

            assistant.code_review(&code, &language, cancel).await?
        },
    };

    Ok(Json(response))
}

pub async fn catalog() -> Json<Catalog> {
    Json(Catalog {
        topics: &TOPICS,
        skill_levels: SkillLevel::ALL,
    })
}

pub async fn learning_path(query: Result<Query<LearningPathQuery>, QueryRejection>) -> Result<Json<LearningPath>, ApiError> {
    let Query(query) = query?;

    Ok(Json(LearningPath {
        path: mentor::learning_path(&query.topic, query.skill_level),
        resources: mentor::topic_resources(&query.topic),
    }))
}
