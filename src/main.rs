use std::sync::{Arc, Mutex};

use clap::Parser as _;
use cybershield::{
    ai::client::HttpChatClient,
    assistant::Assistant,
    cli::{Cli, Log},
    config::AiConfig,
    metrics::{remote_call::RemoteCallMetrics, MetricsHandler},
    resilience::{RateLimiter, ResilientExecutor, RetryPolicy},
    server::{AppState, Server},
};
use prometheus_client::registry::Registry;
use tracing_subscriber::EnvFilter;

fn init_tracing(log: &Log) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log {
        Log::Plain => builder.init(),
        Log::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    let config = AiConfig::from(&cli);
    for problem in config.validate() {
        tracing::warn!("configuration problem: {problem}");
    }

    let mut registry = Registry::default();
    let remote_call_metrics = RemoteCallMetrics::register(&mut registry);
    let metrics_handler = MetricsHandler::new(Arc::new(Mutex::new(registry)));

    let client = HttpChatClient::new(&config.base_url, config.api_key.clone(), config.retry.timeout)?;
    let policy = RetryPolicy::new(config.retry.max_retries, config.retry.base_delay)?.with_jitter(config.retry.jitter);
    let executor = ResilientExecutor::new(Arc::new(RateLimiter::new(config.retry.min_interval)), policy);

    tracing::info!(
        model = %config.default_model,
        max_retries = config.retry.max_retries,
        min_interval = ?config.retry.min_interval,
        "starting"
    );

    let assistant = Assistant::new(client, executor, Arc::new(config), remote_call_metrics);
    let server = Server::new(cli.port, AppState::new(assistant, metrics_handler));
    server.start().await
}
