//! Score, history and summary handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use smartcents_core::{ChangeLog, FinancialSummary, ScoreBreakdown, ScoreHistory};

#[derive(Serialize)]
pub struct ScoreResponse {
    pub score: u8,
    pub breakdown: ScoreBreakdown,
}

/// GET /api/score - Current independence score with its components
pub async fn get_score(State(state): State<Arc<AppState>>) -> Result<Json<ScoreResponse>, AppError> {
    let breakdown = state.app()?.score_breakdown()?;
    Ok(Json(ScoreResponse {
        score: breakdown.score,
        breakdown,
    }))
}

/// GET /api/score/log - Recent score changes, most recent first
pub async fn get_change_log(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChangeLog>, AppError> {
    let log = state.app()?.change_log()?;
    Ok(Json(log))
}

/// GET /api/score/history - Raw hourly and minute series
pub async fn get_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScoreHistory>, AppError> {
    let history = state.app()?.history()?;
    Ok(Json(history))
}

/// GET /api/summary - Totals, rates, categories and spending trend
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FinancialSummary>, AppError> {
    let summary = state.app()?.financial_summary()?;
    Ok(Json(summary))
}
