//! Admin API: the message channel other contexts use to reach the capture
//! state, plus health, badge, navigation and player hand-off.

use crate::error::CatcherError;
use crate::player::{PlayerClient, PlayerPayload};
use crate::protocol::Message;
use crate::service::CatcherHandle;
use crate::session::NavigationEvent;
use crate::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AdminState {
    catcher: CatcherHandle,
    player: PlayerClient,
}

impl AdminState {
    pub fn new(catcher: CatcherHandle, player: PlayerClient) -> Self {
        Self { catcher, player }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct NavigationResponse {
    reset: bool,
}

#[derive(Deserialize)]
struct PlayRequest {
    url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayResponse {
    url: String,
    format: String,
    target: String,
}

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/badge", get(badge_handler))
        .route("/metrics", get(metrics_handler))
        .route("/message", post(message_handler))
        .route("/navigation", post(navigation_handler))
        .route("/play", post(play_handler))
        .with_state(state)
}

pub async fn start_admin_server(addr: SocketAddr, state: AdminState) -> Result<()> {
    info!("Starting Admin API on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        CatcherError::Network(format!("Failed to bind admin address {}: {}", addr, e))
    })?;

    axum::serve(listener, router(state))
        .await
        .map_err(|e| CatcherError::Network(format!("Admin server failed: {}", e)))?;

    Ok(())
}

fn unavailable(e: CatcherError) -> Response {
    warn!("Admin request failed: {}", e);
    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"error": e.to_string()}))).into_response()
}

fn bad_request(rejection: JsonRejection) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": rejection.body_text()}))).into_response()
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn badge_handler(State(state): State<AdminState>) -> Response {
    match state.catcher.badge().await {
        Ok(badge) => Json(badge).into_response(),
        Err(e) => unavailable(e),
    }
}

async fn metrics_handler(State(state): State<AdminState>) -> Response {
    match state.catcher.stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => unavailable(e),
    }
}

async fn message_handler(
    State(state): State<AdminState>,
    message: std::result::Result<Json<Message>, JsonRejection>,
) -> Response {
    let Json(message) = match message {
        Ok(message) => message,
        Err(rejection) => return bad_request(rejection),
    };
    match state.catcher.send_message(message).await {
        Ok(Some(snapshot)) => Json(snapshot).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => unavailable(e),
    }
}

async fn navigation_handler(
    State(state): State<AdminState>,
    event: std::result::Result<Json<NavigationEvent>, JsonRejection>,
) -> Response {
    let Json(event) = match event {
        Ok(event) => event,
        Err(rejection) => return bad_request(rejection),
    };
    match state.catcher.navigate(event).await {
        Ok(reset) => Json(NavigationResponse { reset }).into_response(),
        Err(e) => unavailable(e),
    }
}

async fn play_handler(
    State(state): State<AdminState>,
    request: std::result::Result<Json<PlayRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return bad_request(rejection),
    };

    let captured = match state.catcher.lookup(request.url.as_str()).await {
        Ok(Some(captured)) => captured,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": format!("not captured: {}", request.url)})),
            )
                .into_response()
        }
        Err(e) => return unavailable(e),
    };
    let settings = match state.catcher.settings().await {
        Ok(settings) => settings,
        Err(e) => return unavailable(e),
    };

    let target = PlayerPayload::new(&captured).target_url(&settings);
    info!("Sending {} to player at {}", captured.url, target);
    let response = PlayResponse {
        url: captured.url.clone(),
        format: captured.format_label(),
        target,
    };
    state.player.beacon(captured, settings);

    (StatusCode::ACCEPTED, Json(response)).into_response()
}
