//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::{domain::Update, ui::state::AppState};

/// Snapshot of the broadcast engine for debugging
#[derive(Debug, Serialize)]
pub struct DebugStateDto {
    pub connections: usize,
    pub history: Vec<Update>,
}

/// Debug endpoint to get the current connection count and history (for testing purposes)
pub async fn debug_state(State(state): State<Arc<AppState>>) -> Json<DebugStateDto> {
    Json(DebugStateDto {
        connections: state.broadcaster.registry().size(),
        history: state.broadcaster.history().snapshot(),
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
