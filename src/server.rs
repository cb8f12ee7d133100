//! HTTP surface: task intake, liveness, and run status.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use reqwest::Client;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::pipeline;
use crate::registry::{RunRecord, RunRegistry, RunState};
use crate::types::{ReadyResponse, TaskRequest};

/// State shared across all handlers and spawned pipeline runs.
pub struct AppState {
    pub config: AppConfig,
    pub client: Client,
    pub registry: RunRegistry,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            client: Client::new(),
            registry: RunRegistry::new(),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/ready", post(ready))
        .route("/runs/:id", get(run_status))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// GET / - unauthenticated liveness probe.
async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "running" }))
}

/// POST /ready - authenticate and schedule the pipeline.
///
/// The 200 acknowledgment is returned as soon as the run is spawned; every
/// pipeline side effect (file writes, commits, the evaluator callback)
/// happens after the response. A secret mismatch produces a 401 and no
/// background work at all.
async fn ready(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TaskRequest>,
) -> Result<Json<ReadyResponse>, (StatusCode, Json<ReadyResponse>)> {
    if req.secret != state.config.student_secret {
        warn!("rejected /ready for task {}: secret mismatch", req.task);
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ReadyResponse {
                status: "error".to_string(),
                message: "Invalid secret".to_string(),
            }),
        ));
    }

    let run_id = state.registry.register(&req.task, req.round);
    state.registry.advance(run_id, RunState::Validated);
    info!("accepted task {} round {} as run {}", req.task, req.round, run_id);

    let task_name = req.task.clone();
    tokio::spawn(pipeline::run_task(state.clone(), run_id, req));

    Ok(Json(ReadyResponse {
        status: "ready".to_string(),
        message: format!("Task {} started.", task_name),
    }))
}

/// GET /runs/:id - status of one pipeline run.
async fn run_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RunRecord>, StatusCode> {
    state.registry.get(id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

pub async fn run_server(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("listening on {}", addr);
    info!("  POST /ready    - accept a task and schedule publication");
    info!("  GET  /         - liveness");
    info!("  GET  /runs/:id - run status");

    axum::serve(listener, app).await?;
    Ok(())
}
