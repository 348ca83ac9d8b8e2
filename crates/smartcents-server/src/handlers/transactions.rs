//! Transaction handlers

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;

use super::parse_body;
use crate::{AppError, AppState};
use smartcents_core::{NewTransaction, Transaction};

/// Response for bulk deletes
#[derive(Serialize)]
pub struct ResetResponse {
    pub success: bool,
    pub removed: usize,
}

/// GET /api/transactions - List all transactions, oldest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let transactions = state.app()?.list_transactions()?;
    Ok(Json(transactions))
}

/// POST /api/transactions - Record an income or expense
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Transaction>, AppError> {
    let new: NewTransaction = parse_body(&body)?;
    let transaction = state.app()?.add_transaction(new)?;
    Ok(Json(transaction))
}

/// DELETE /api/transactions - Remove every transaction
pub async fn reset_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResetResponse>, AppError> {
    let removed = state.app()?.reset_transactions()?;
    Ok(Json(ResetResponse {
        success: true,
        removed,
    }))
}
