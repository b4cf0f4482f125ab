//! HTTP + WebSocket API for the chat window
//!
//! Endpoints:
//! - GET  /health                    - Health check
//! - GET  /quick-actions             - Quick action buttons
//! - POST /match                     - Stateless match
//! - POST /session/new               - Create conversation
//! - GET  /session/:id               - Turn log
//! - DELETE /session/:id             - Close conversation
//! - POST /session/:id/message       - Submit user text
//! - POST /session/:id/quick/:index  - Submit a quick action
//! - POST /session/:id/reset         - Reset conversation
//! - WS   /ws/:id                    - Live events (text frames are submitted)

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
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{info, warn};

use crate::core::{ConversationHost, IntentMatcher, Submission, ThinkingDelay};
use crate::error::AssistantError;
use crate::types::{ConversationEvent, Turn, QUICK_ACTIONS};
use crate::GREETING;

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, Arc<ConversationHost>>>,
    pub matcher: Arc<IntentMatcher>,
    pub delay: ThinkingDelay,
}

/// Stateless match request
#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub text: String,
}

/// Stateless match response
#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub reply: String,
    /// Matched rule, null on the default path
    pub rule: Option<String>,
}

/// Create session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
    pub greeting: String,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub pending: bool,
    pub turns: Vec<Turn>,
}

/// Submit message request
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
    /// Hold the response until the reply is appended
    #[serde(default)]
    pub wait: bool,
}

/// Quick action request (body optional)
#[derive(Debug, Default, Deserialize)]
pub struct QuickRequest {
    #[serde(default)]
    pub wait: bool,
}

/// Submit response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub user_turn: Turn,
    /// Present only when the request asked to wait
    pub reply: Option<Turn>,
}

/// Reset response
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub turn: Turn,
}

/// Quick action entry
#[derive(Debug, Serialize)]
pub struct QuickActionEntry {
    pub index: usize,
    pub label: &'static str,
    pub prompt: &'static str,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
    pub rules: usize,
}

/// Create the API router
pub fn create_router(matcher: Arc<IntentMatcher>, delay: ThinkingDelay) -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
        matcher,
        delay,
    });

    Router::new()
        .route("/health", get(health))
        .route("/quick-actions", get(quick_actions))
        .route("/match", post(match_text))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session).delete(delete_session))
        .route("/session/:id/message", post(post_message))
        .route("/session/:id/quick/:index", post(post_quick_action))
        .route("/session/:id/reset", post(reset_session))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

fn status_for(err: &AssistantError) -> StatusCode {
    match err {
        AssistantError::ReplyPending => StatusCode::CONFLICT,
        AssistantError::UnknownQuickAction(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn find_session(state: &AppState, id: &str) -> Result<Arc<ConversationHost>, StatusCode> {
    let sessions = state.sessions.read().await;
    sessions.get(id).cloned().ok_or(StatusCode::NOT_FOUND)
}

async fn submission_response(submission: Submission, wait: bool) -> MessageResponse {
    let reply = if wait { submission.reply.wait().await } else { None };
    MessageResponse {
        user_turn: submission.user_turn,
        reply,
    }
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
        rules: state.matcher.table().len(),
    })
}

/// List quick action buttons
async fn quick_actions() -> Json<Vec<QuickActionEntry>> {
    Json(
        QUICK_ACTIONS
            .iter()
            .enumerate()
            .map(|(index, a)| QuickActionEntry {
                index,
                label: a.label,
                prompt: a.prompt,
            })
            .collect(),
    )
}

/// Match without a conversation
async fn match_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MatchRequest>,
) -> Json<MatchResponse> {
    let resolution = state.matcher.resolve(&req.text);
    let reply = resolution.pick(&mut rand::thread_rng()).to_string();
    Json(MatchResponse {
        reply,
        rule: resolution.source.rule_name().map(str::to_string),
    })
}

/// Create new session
async fn create_session(State(state): State<Arc<AppState>>) -> Json<NewSessionResponse> {
    let session_id = generate_session_id();
    let host = ConversationHost::new(Arc::clone(&state.matcher), state.delay);

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), Arc::new(host));
    info!(session = %session_id, active = sessions.len(), "session created");

    Json(NewSessionResponse {
        websocket_url: format!("/ws/{}", session_id),
        session_id,
        greeting: GREETING.to_string(),
    })
}

/// Get session turn log
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, StatusCode> {
    let host = find_session(&state, &id).await?;
    Ok(Json(SessionResponse {
        session_id: id,
        pending: host.is_pending().await,
        turns: host.turns().await,
    }))
}

/// Close a session, cancelling any pending reply
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    let mut sessions = state.sessions.write().await;
    match sessions.remove(&id) {
        Some(host) => {
            host.close().await;
            info!(session = %id, active = sessions.len(), "session closed");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// Submit user text
async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, StatusCode> {
    let host = find_session(&state, &id).await?;
    let submission = host.submit(&req.text).await.map_err(|e| status_for(&e))?;
    Ok(Json(submission_response(submission, req.wait).await))
}

/// Submit a quick action
async fn post_quick_action(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(String, usize)>,
    req: Option<Json<QuickRequest>>,
) -> Result<Json<MessageResponse>, StatusCode> {
    let host = find_session(&state, &id).await?;
    let wait = req.map(|Json(r)| r.wait).unwrap_or_default();
    let submission = host.quick_action(index).await.map_err(|e| status_for(&e))?;
    Ok(Json(submission_response(submission, wait).await))
}

/// Reset a session
async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ResetResponse>, StatusCode> {
    let host = find_session(&state, &id).await?;
    Ok(Json(ResetResponse {
        turn: host.reset().await,
    }))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let host = find_session(&state, &id).await?;
    let rx = host.subscribe();

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, host, rx).await;
    }))
}

/// Error frame sent back over the socket when a submission is refused
#[derive(Debug, Serialize)]
pub struct SocketError {
    pub event: &'static str,
    /// HTTP status the same failure maps to
    pub code: u16,
    pub message: String,
}

fn error_frame(err: &AssistantError) -> String {
    let frame = SocketError {
        event: "error",
        code: status_for(err).as_u16(),
        message: err.to_string(),
    };
    serde_json::to_string(&frame).unwrap_or_default()
}

/// Push events and error frames out, submit incoming text frames
async fn handle_websocket(
    socket: WebSocket,
    host: Arc<ConversationHost>,
    mut rx: broadcast::Receiver<ConversationEvent>,
) {
    let (mut sender, mut receiver) = socket.split();
    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel::<String>();

    let mut push = tokio::spawn(async move {
        loop {
            let frame = tokio::select! {
                event = rx.recv() => match event {
                    Ok(event) => serde_json::to_string(&event).unwrap_or_default(),
                    Err(_) => break,
                },
                notice = notice_rx.recv() => match notice {
                    Some(notice) => notice,
                    None => break,
                },
            };
            if sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    let mut pull = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if let Err(e) = host.submit(&text).await {
                        warn!(error = %e, "websocket submission refused");
                        if notice_tx.send(error_frame(&e)).is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut push => pull.abort(),
        _ = &mut pull => push.abort(),
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    format!("session_{:016x}", rand::random::<u64>())
}

/// Run the API server
pub async fn run_server(
    addr: &str,
    matcher: Arc<IntentMatcher>,
    delay: ThinkingDelay,
) -> Result<(), Box<dyn std::error::Error>> {
    let rules = matcher.table().len();
    let router = create_router(matcher, delay);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, rules, "carlbot API listening");
    println!("carlbot API running on {}", addr);
    println!("  GET  /health                   - Health check");
    println!("  GET  /quick-actions            - Quick action buttons");
    println!("  POST /match                    - Stateless match");
    println!("  POST /session/new              - Create session");
    println!("  GET  /session/:id              - Turn log");
    println!("  DELETE /session/:id            - Close session");
    println!("  POST /session/:id/message      - Send message");
    println!("  POST /session/:id/quick/:index - Quick action");
    println!("  POST /session/:id/reset        - Reset");
    println!("  WS   /ws/:id                   - Live events");
    axum::serve(listener, router).await?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
