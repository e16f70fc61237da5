//! HTTP + WebSocket API around a single pipeline
//!
//! Endpoints:
//! - GET /health - Health check
//! - POST /messages - Score one message
//! - GET /users/:id - Window state for a user
//! - WS /ws - Live stream of results
//!
//! Messages are applied under the pipeline write lock, so per-user arrival
//! order is preserved.

use axum::{
    extract::{ws::{Message as WsMessage, WebSocket}, Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{broadcast, broadcast::error::RecvError, Mutex, RwLock};
use tracing::{error, info, warn};

use crate::core::alert_log::AlertLog;
use crate::core::pipeline::DriftPipeline;
use crate::error::{DriftError, PipelineError};
use crate::types::{AnalysisResult, Message, WindowState};

/// Shared server state
pub struct AppState {
    pub pipeline: RwLock<DriftPipeline>,
    pub alert_log: Option<Mutex<AlertLog>>,
    pub updates: broadcast::Sender<AnalysisResult>,
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub users_tracked: usize,
    pub window_size: usize,
    pub threshold: f64,
    pub lexicon: String,
}

/// User status response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserStatusResponse {
    pub user: String,
    pub recent_scores: Vec<f64>,
    pub last_score: f64,
    pub state: Option<WindowState>,
}

/// Error body for rejected messages
#[derive(Debug)]
pub struct ApiError(PipelineError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            PipelineError::MissingUserState(_) => StatusCode::NOT_FOUND,
            PipelineError::EmptyUser { .. } => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Create the API router
pub fn create_router(pipeline: DriftPipeline, alert_log: Option<AlertLog>) -> Router {
    let (updates, _) = broadcast::channel(256);
    let state = Arc::new(AppState {
        pipeline: RwLock::new(pipeline),
        alert_log: alert_log.map(Mutex::new),
        updates,
    });

    Router::new()
        .route("/health", get(health))
        .route("/messages", post(post_message))
        .route("/users/:id", get(get_user))
        .route("/ws", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let pipeline = state.pipeline.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        users_tracked: pipeline.user_count(),
        window_size: pipeline.window_size(),
        threshold: pipeline.threshold(),
        lexicon: pipeline.lexicon().version().to_string(),
    })
}

/// Score one message
async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(message): Json<Message>,
) -> Result<Json<AnalysisResult>, ApiError> {
    // Log and broadcast under the write lock so both follow processing order
    let mut pipeline = state.pipeline.write().await;
    let result = pipeline.process(&message).map_err(ApiError)?;

    if let Some(log) = &state.alert_log {
        if let Err(e) = log.lock().await.record(&result) {
            error!(error = %e, "failed to persist alert");
        }
    }

    // No subscribers is fine
    let _ = state.updates.send(result.clone());
    drop(pipeline);
    Ok(Json(result))
}

/// Window state for one user
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserStatusResponse>, StatusCode> {
    let id = id.trim();
    let pipeline = state.pipeline.read().await;
    let user = pipeline.user(id).ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(UserStatusResponse {
        user: user.user_id.clone(),
        recent_scores: user.recent_scores.iter().copied().collect(),
        last_score: user.last_score,
        state: pipeline.user_window_state(id),
    }))
}

/// WebSocket handler for live results
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = state.updates.subscribe();
    ws.on_upgrade(move |socket| handle_websocket(socket, rx))
}

async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<AnalysisResult>) {
    let (mut sender, mut receiver) = socket.split();
    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Ok(result) => {
                    let json = serde_json::to_string(&result).unwrap_or_default();
                    if sender.send(WsMessage::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "websocket subscriber lagging");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

/// Run the API server
pub async fn run_server(
    addr: &str,
    pipeline: DriftPipeline,
    alert_log: Option<AlertLog>,
) -> Result<(), DriftError> {
    let router = create_router(pipeline, alert_log);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr, "driftwatch API listening");
    axum::serve(listener, router).await?;
    Ok(())
}
