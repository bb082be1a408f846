use std::{net::Ipv4Addr, sync::Arc};

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    routing::get,
    routing::post,
    Router,
};
use tokio::{net::TcpListener, signal::unix::{self, SignalKind}};
use tokio_util::sync::CancellationToken;

use crate::{ai::ChatCompletion, assistant::Assistant, metrics::MetricsHandler};

pub mod chat;
pub mod error;
pub mod health;
pub mod mentor;

pub struct AppState<C> {
    pub assistant: Assistant<C>,
    pub metrics_handler: MetricsHandler,
    /// Cancelled on shutdown so pending rate limiter and backoff waits end early.
    pub shutdown: CancellationToken,
}

impl<C> AppState<C> {
    pub fn new(assistant: Assistant<C>, metrics_handler: MetricsHandler) -> Self {
        Self {
            assistant,
            metrics_handler,
            shutdown: CancellationToken::new(),
        }
    }
}

pub struct Server<C> {
    port: u16,
    state: AppState<C>,
}

impl<C> Server<C>
where
    C: ChatCompletion + Send + Sync + 'static,
{
    pub fn new(port: u16, state: AppState<C>) -> Self {
        Self {
            port,
            state,
        }
    }

    pub fn router(state: Arc<AppState<C>>) -> Router {
        Router::new()
            .route("/api/chat", post(chat::handle::<C>))
            .route("/api/mentor", get(mentor::catalog).post(mentor::handle::<C>))
            .route("/api/mentor/learning-path", get(mentor::learning_path))
            .route("/api/health", get(health::handle::<C>))
            .route("/metrics", get(metrics::<C>))
            .with_state(state)
    }

    pub async fn start(self) -> anyhow::Result<()> {
        let shutdown = self.state.shutdown.clone();
        let app = Self::router(Arc::new(self.state));

        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, self.port)).await?;

        tracing::info!("listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                tracing::info!("shutting down");
                shutdown.cancel();
            })
            .await?;

        Ok(())
    }
}

#[tracing::instrument(skip_all)]
async fn metrics<C>(State(state): State<Arc<AppState<C>>>) -> impl IntoResponse
where
    C: ChatCompletion + Send + Sync + 'static,
{
    match state.metrics_handler.encode() {
        Ok(res) => (
            StatusCode::OK,
            [(CONTENT_TYPE, "application/openmetrics-text; version=1.0.0; charset=utf-8")],
            res,
        ).into_response(),
        Err(err) => {
            tracing::error!("{err:?}");
            (StatusCode::INTERNAL_SERVER_ERROR, "").into_response()
        },
    }
}

async fn shutdown_signal() {
    let mut sigint = unix::signal(SignalKind::interrupt()).expect("SIGINT error");
    let mut sigterm = unix::signal(SignalKind::terminate()).expect("SIGTERM error");

    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
}
