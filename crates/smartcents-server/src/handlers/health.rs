//! Health check handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use smartcents_core::TipGenerator;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    /// Tip backend name (`rules`, `openai`, `ollama`)
    pub tips: &'static str,
    pub model: String,
}

/// GET /api/health - Liveness and tip backend in use
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "SmartCents server is running",
        tips: state.tips.backend_name(),
        model: state.tips.model().to_string(),
    })
}
