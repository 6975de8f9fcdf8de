//! HTTP + WebSocket API for gate0
//!
//! Endpoints:
//! - POST /session/new - Create new session
//! - GET /session/{id} - Get session status
//! - POST /session/{id}/submit - Submit an identifier
//! - POST /session/{id}/verify - Manual verification claim
//! - POST /session/{id}/focus - Host focus-regained signal
//! - WS /ws/{id} - Live engine events
//! - GET /health - Health check

use axum::{
    extract::{ws::{Message, WebSocket}, Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::core::engine::SubmitOutcome;
use crate::core::session::{FunnelSession, SessionConfig};
use crate::types::{AuthMode, EngineEvent, FunnelStatus};

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, Arc<FunnelSession>>>,
}

/// Create new session request
#[derive(Debug, Deserialize)]
pub struct NewSessionRequest {
    pub mode: Option<AuthMode>,
    pub region: Option<String>,
    pub seed: Option<u64>,
    /// Run the ambient loops (defaults to true)
    pub ambient: Option<bool>,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub status: FunnelStatus,
}

/// Submit identifier request
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub identifier: String,
}

/// Submit identifier response
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub outcome: String,
    pub stage: String,
}

/// Verify / focus response
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub accepted: bool,
    pub stage: String,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Create the API router
pub fn create_router() -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
    });

    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session))
        .route("/session/:id/submit", post(submit_identifier))
        .route("/session/:id/verify", post(manual_verify))
        .route("/session/:id/focus", post(focus_regained))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Result<Json<NewSessionResponse>, StatusCode> {
    let session_id = generate_session_id();

    let mut config = SessionConfig {
        mode: req.mode.unwrap_or_default(),
        seed: req.seed,
        ambient: req.ambient.unwrap_or(true),
        // Cues travel as events; playback is the client's concern
        audio: false,
        ..SessionConfig::default()
    };
    if let Some(region) = req.region {
        config.region = region;
    }
    let session = Arc::new(FunnelSession::new(config));

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);

    Ok(Json(NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
    }))
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(SessionStatusResponse {
        session_id: id.clone(),
        status: session.status(),
    }))
}

/// Submit an identifier into the funnel
async fn submit_identifier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    let outcome = session.submit(&req.identifier);
    if outcome == SubmitOutcome::Rejected {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    Ok(Json(SubmitResponse {
        outcome: format!("{:?}", outcome),
        stage: session.status().stage.to_string(),
    }))
}

/// User claims the offer is complete
async fn manual_verify(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CheckResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    let accepted = session.manual_verify();
    Ok(Json(CheckResponse {
        accepted,
        stage: session.status().stage.to_string(),
    }))
}

/// Host regained focus; recheck while locked
async fn focus_regained(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CheckResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    let accepted = session.focus_regained();
    Ok(Json(CheckResponse {
        accepted,
        stage: session.status().stage.to_string(),
    }))
}

/// WebSocket handler for live engine events
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = session.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Forward engine events as JSON until the client hangs up
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<EngineEvent>) {
    let (mut sender, mut receiver) = socket.split();

    // Drain inbound frames so pings and close are serviced
    let drain = tokio::spawn(async move { while let Some(Ok(_)) = receiver.next().await {} });

    loop {
        match rx.recv().await {
            Ok(event) => {
                let json = serde_json::to_string(&event).unwrap_or_default();
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    drain.abort();
}

/// Generate session ID
fn generate_session_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("session_{:x}", nanos as u64)
}

/// Run the API server
pub async fn run_server(addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("🎰 gate0 API running on {}", addr);
    println!("  POST /session/new        - Create session");
    println!("  GET  /session/:id        - Get status");
    println!("  POST /session/:id/submit - Submit identifier");
    println!("  POST /session/:id/verify - Manual verification");
    println!("  POST /session/:id/focus  - Focus-regained signal");
    println!("  WS   /ws/:id             - Live events");
    println!("  GET  /health             - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
