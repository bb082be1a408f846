use std::{
    collections::VecDeque,
    net::{Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex},
    time::Duration,
};

use cybershield::{
    ai::{AiError, ChatCompletion, ChatResponse, CompletionRequest, Role},
    assistant::Assistant,
    config::AiConfig,
    metrics::{remote_call::RemoteCallMetrics, MetricsHandler},
    resilience::{RateLimiter, ResilientExecutor, RetryPolicy},
    server::{AppState, Server},
};
use prometheus_client::registry::Registry;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Answers from a fixed script and keeps every request it receives.
#[derive(Clone, Default)]
struct ScriptedClient {
    responses: Arc<Mutex<VecDeque<Result<ChatResponse, AiError>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedClient {
    fn new(responses: impl IntoIterator<Item = Result<ChatResponse, AiError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into_iter().collect())),
            requests: Arc::default(),
        }
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ChatCompletion for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<ChatResponse, AiError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AiError::MalformedResponse("script exhausted".to_string())))
    }
}

fn unavailable() -> AiError {
    AiError::Status {
        status: 503,
        reason: "Service Unavailable".to_string(),
    }
}

async fn serve(client: ScriptedClient, api_key: Option<&str>) -> SocketAddr {
    let mut registry = Registry::default();
    let remote_call_metrics = RemoteCallMetrics::register(&mut registry);
    let metrics_handler = MetricsHandler::new(Arc::new(Mutex::new(registry)));

    let config = AiConfig {
        api_key: api_key.map(str::to_string),
        ..AiConfig::default()
    };
    let executor = ResilientExecutor::new(
        Arc::new(RateLimiter::new(Duration::from_millis(20))),
        RetryPolicy::new(3, Duration::from_millis(10)).unwrap(),
    );
    let assistant = Assistant::new(client, executor, Arc::new(config), remote_call_metrics);
    let state = Arc::new(AppState::new(assistant, metrics_handler));

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, Server::router(state)).await.unwrap();
    });

    addr
}

async fn post(addr: SocketAddr, path: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("http://{addr}{path}"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();

    (status, response.json().await.unwrap())
}

async fn get(addr: SocketAddr, path: &str) -> (u16, String) {
    let response = reqwest::get(format!("http://{addr}{path}")).await.unwrap();
    let status = response.status().as_u16();

    (status, response.text().await.unwrap())
}

#[tokio::test]
async fn chat() {
    let client = ScriptedClient::new([Ok(ChatResponse::assistant("Phishing is social engineering."))]);
    let addr = serve(client.clone(), Some("key")).await;

    let (status, body) = post(
        addr,
        "/api/chat",
        json!({ "messages": [{ "role": "user", "content": "Hello! Can you help me with cybersecurity?" }] }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({ "content": "Phishing is social engineering.", "role": "assistant" }));

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "gemini-2.0-flash");
    assert_eq!(requests[0].messages[0].role, Role::User);
}

#[tokio::test]
async fn chat_retries_and_records_metrics() {
    let client = ScriptedClient::new([Err(unavailable()), Ok(ChatResponse::assistant("recovered"))]);
    let addr = serve(client.clone(), Some("key")).await;

    let (status, body) = post(addr, "/api/chat", json!({ "messages": [{ "role": "user", "content": "hi" }] })).await;

    assert_eq!(status, 200);
    assert_eq!(body["content"], "recovered");
    assert_eq!(client.requests().len(), 2);

    let (status, metrics) = get(addr, "/metrics").await;
    assert_eq!(status, 200);
    assert!(metrics.contains("cybershield_remote_attempts_total{outcome=\"transient\"} 1"));
    assert!(metrics.contains("cybershield_remote_attempts_total{outcome=\"success\"} 1"));
}

#[tokio::test]
async fn chat_surfaces_final_error() {
    let client = ScriptedClient::new([Err(unavailable()), Err(unavailable()), Err(unavailable())]);
    let addr = serve(client.clone(), Some("key")).await;

    let (status, body) = post(addr, "/api/chat", json!({ "messages": [{ "role": "user", "content": "hi" }] })).await;

    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "chat completion API error: 503 Service Unavailable" }));
    assert_eq!(client.requests().len(), 3);
}

#[tokio::test]
async fn chat_rejects_invalid_messages() {
    let client = ScriptedClient::default();
    let addr = serve(client.clone(), Some("key")).await;

    let (status, body) = post(addr, "/api/chat", json!({ "messages": "hello" })).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "Invalid messages format" }));

    let (status, body) = post(addr, "/api/chat", json!({ "messages": [{ "content": "hello" }] })).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "Invalid message format" }));

    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn mentor() {
    let client = ScriptedClient::new([Ok(ChatResponse::assistant("Start with the OSI model."))]);
    let addr = serve(client.clone(), Some("key")).await;

    let (status, body) = post(
        addr,
        "/api/mentor",
        json!({ "type": "mentor", "userQuery": "What is network security?", "skillLevel": "beginner" }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["content"], "Start with the OSI model.");

    let requests = client.requests();
    assert!(requests[0].messages[0].content.contains("for beginner level students"));
    assert_eq!(requests[0].messages[1].content, "What is network security?");
}

#[tokio::test]
async fn mentor_rejects_missing_fields() {
    let client = ScriptedClient::default();
    let addr = serve(client.clone(), Some("key")).await;

    let (status, body) = post(addr, "/api/mentor", json!({ "type": "code_review", "code": " " })).await;

    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "Missing required field: code" }));
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn mentor_catalog() {
    let addr = serve(ScriptedClient::default(), Some("key")).await;

    let (status, body) = get(addr, "/api/mentor").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, 200);
    assert_eq!(body["topics"][0], "Network Security");
    assert_eq!(body["skillLevels"], json!(["beginner", "intermediate", "advanced"]));

    let (status, body) = get(addr, "/api/mentor/learning-path?topic=Network%20Security&skillLevel=advanced").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, 200);
    assert_eq!(body["path"], json!(["Network forensics", "Advanced attacks", "Defense strategies"]));
}

#[tokio::test]
async fn health() {
    let addr = serve(ScriptedClient::default(), Some("key")).await;
    let (status, body) = get(addr, "/api/health").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["config"]["hasApiKey"], true);

    let addr = serve(ScriptedClient::default(), None).await;
    let (status, body) = get(addr, "/api/health").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, 503);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["errors"], json!(["Gemini API key is required"]));
}
