use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    ai::ChatCompletion,
    config::AiConfig,
    server::AppState,
};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub config: HealthConfig,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthConfig {
    pub has_api_key: bool,
    pub default_model: String,
    pub environment: String,
}

impl HealthStatus {
    pub fn check(config: &AiConfig, timestamp: DateTime<Utc>) -> (StatusCode, Self) {
        let errors = config.validate().iter().map(ToString::to_string).collect::<Vec<_>>();
        let (status_code, status) = if errors.is_empty() {
            (StatusCode::OK, "healthy")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        };

        let health = Self {
            status,
            timestamp,
            config: HealthConfig {
                has_api_key: config.has_api_key(),
                default_model: config.default_model.clone(),
                environment: config.environment.clone(),
            },
            errors,
        };

        (status_code, health)
    }
}

#[tracing::instrument(skip_all)]
pub async fn handle<C>(State(state): State<Arc<AppState<C>>>) -> (StatusCode, Json<HealthStatus>)
where
    C: ChatCompletion + Send + Sync + 'static,
{
    let (status_code, health) = HealthStatus::check(state.assistant.config(), Utc::now());
    if !health.errors.is_empty() {
        tracing::warn!(errors = ?health.errors, "configuration is unhealthy");
    }

    (status_code, Json(health))
}
