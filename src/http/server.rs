//! Local invocation server.
//!
//! # Responsibilities
//! - Expose each edge stage as `POST /invoke/{stage}` taking a platform event
//! - Return the transformed request exactly as the platform would receive it
//! - Wire up middleware (tracing, timeout, body limit)
//! - Swap in rebuilt pipelines when the configuration changes

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{PrerenderConfig, ServerConfig};
use crate::edge::{EdgeEvent, EventError, RequestRecord};
use crate::handler::{Pipeline, Stage, UnknownStage};
use crate::lifecycle::Shutdown;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<ArcSwap<Pipeline>>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(ArcSwap::from_pointee(pipeline)),
        }
    }

    /// Current pipeline snapshot.
    pub fn pipeline(&self) -> Arc<Pipeline> {
        self.pipeline.load_full()
    }

    /// Atomically replace the pipeline; in-flight invocations keep the old one.
    pub fn reload(&self, pipeline: Pipeline) {
        self.pipeline.store(Arc::new(pipeline));
    }

    /// Rebuild the pipeline for every validated config received, until shutdown.
    pub fn spawn_reloader(
        &self,
        mut updates: mpsc::UnboundedReceiver<PrerenderConfig>,
        shutdown: Shutdown,
    ) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        let stopped = shutdown.signalled();
        tokio::spawn(async move {
            tokio::pin!(stopped);
            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    update = updates.recv() => {
                        let Some(config) = update else { break };
                        match Pipeline::from_config(&config) {
                            Ok(pipeline) => {
                                state.reload(pipeline);
                                tracing::info!("Pipeline reloaded from updated configuration");
                            }
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    "Updated configuration rejected, keeping current pipeline"
                                );
                            }
                        }
                    }
                }
            }
        })
    }
}

/// Errors surfaced to callers of the invocation endpoint.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error(transparent)]
    UnknownStage(#[from] UnknownStage),

    #[error(transparent)]
    Event(#[from] EventError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for InvokeError {
    fn into_response(self) -> Response {
        let status = match self {
            InvokeError::UnknownStage(_) => StatusCode::NOT_FOUND,
            InvokeError::Event(_) => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub version: &'static str,
    pub status: &'static str,
}

/// HTTP server for local and integration invocation of the edge stages.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server around an already compiled pipeline.
    pub fn new(config: &ServerConfig, pipeline: Pipeline) -> Self {
        let state = AppState::new(pipeline);
        let router = Self::build_router(config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/invoke/{stage}", post(invoke_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Router handle, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Invocation server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        tracing::info!("Invocation server stopped");
        Ok(())
    }
}

/// Run one stage against the posted event.
async fn invoke_handler(
    State(state): State<AppState>,
    Path(stage): Path<String>,
    Json(event): Json<EdgeEvent>,
) -> Result<Json<RequestRecord>, InvokeError> {
    let stage: Stage = stage.parse()?;
    let request = state.pipeline().invoke(stage, event)?;

    tracing::debug!(stage = %stage, uri = %request.uri, "Invocation completed");
    Ok(Json(request))
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}
