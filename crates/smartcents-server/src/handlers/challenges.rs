//! Daily challenge handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{AppError, AppState, SuccessResponse};
use smartcents_core::{ChallengeInstance, CompletionOutcome};

#[derive(Serialize)]
pub struct CompleteChallengeResponse {
    pub outcome: CompletionOutcome,
    /// Score after the action
    pub score: u8,
    pub challenges: Vec<ChallengeInstance>,
}

/// GET /api/challenges - Today's three challenges
pub async fn list_challenges(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChallengeInstance>>, AppError> {
    let challenges = state.app()?.todays_challenges()?;
    Ok(Json(challenges))
}

/// POST /api/challenges/:id/complete - Advance one of today's challenges
pub async fn complete_challenge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CompleteChallengeResponse>, AppError> {
    let mut app = state.app()?;
    let outcome = app.complete_challenge(&id)?;
    if outcome == CompletionOutcome::NotFound {
        return Err(AppError::not_found(&format!(
            "Challenge {} is not in today's set",
            id
        )));
    }
    Ok(Json(CompleteChallengeResponse {
        outcome,
        score: app.current_score()?,
        challenges: app.todays_challenges()?,
    }))
}

/// POST /api/challenges/reset - Forget today's draw
pub async fn reset_challenges(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.app()?.reset_challenges()?;
    Ok(Json(SuccessResponse { success: true }))
}
