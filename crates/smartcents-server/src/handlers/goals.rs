//! Savings goal handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{parse_body, ResetResponse};
use crate::{AppError, AppState, SuccessResponse};
use smartcents_core::{Goal, GoalForecast, GoalProgressOutcome, NewGoal};

/// Request body for adding progress to a goal
#[derive(Debug, Deserialize)]
pub struct GoalProgressRequest {
    pub amount: f64,
}

#[derive(Serialize)]
pub struct GoalProgressResponse {
    #[serde(flatten)]
    pub outcome: GoalProgressOutcome,
    pub message: String,
}

/// GET /api/goals - List all goals
pub async fn list_goals(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Goal>>, AppError> {
    let goals = state.app()?.list_goals()?;
    Ok(Json(goals))
}

/// POST /api/goals - Create a savings goal
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Goal>, AppError> {
    let new: NewGoal = parse_body(&body)?;
    let goal = state.app()?.add_goal(new)?;
    Ok(Json(goal))
}

/// DELETE /api/goals - Remove every goal
pub async fn reset_goals(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResetResponse>, AppError> {
    let removed = state.app()?.reset_goals()?;
    Ok(Json(ResetResponse {
        success: true,
        removed,
    }))
}

/// DELETE /api/goals/:id - Remove one goal
pub async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.app()?.delete_goal(&id)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/goals/:id/progress - Add savings to a goal
pub async fn add_goal_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<GoalProgressResponse>, AppError> {
    let req: GoalProgressRequest = parse_body(&body)?;
    let outcome = state.app()?.add_goal_progress(&id, req.amount)?;
    Ok(Json(GoalProgressResponse {
        message: outcome.message(),
        outcome,
    }))
}

/// GET /api/goals/predictions - Completion estimates for active goals
pub async fn goal_predictions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GoalForecast>>, AppError> {
    let forecasts = state.app()?.goal_predictions()?;
    Ok(Json(forecasts))
}
