//! Mentor tip and chatbot handlers
//!
//! Records may come in the request body (for clients that keep their own
//! copy) or, when omitted, from the store. The app lock is released before
//! any call to the tip backend.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::parse_body;
use crate::{AppError, AppState, MAX_MESSAGE_LEN};
use smartcents_core::{
    compute_score, generate_tip_with_fallback, ChatRequest, Clock, Goal, TipClient,
    TipGenerator, TipRequest, Transaction,
};

/// Request body for a mentor tip
#[derive(Debug, Default, Deserialize)]
pub struct MentorTipRequest {
    #[serde(default)]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default)]
    pub goals: Option<Vec<Goal>>,
}

#[derive(Serialize)]
pub struct MentorTipResponse {
    pub success: bool,
    pub tip: String,
    pub model: String,
    /// Whether the rule-based tip stood in for the configured backend
    pub fallback: bool,
    /// The financial summary the tip was written from
    pub context: String,
}

/// Request body for the chatbot
#[derive(Debug, Deserialize)]
pub struct ChatbotRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default)]
    pub goals: Option<Vec<Goal>>,
    /// Score as the client sees it; computed from the records when absent
    #[serde(default)]
    pub score: Option<u8>,
}

#[derive(Serialize)]
pub struct ChatbotResponse {
    pub success: bool,
    pub reply: String,
    pub model: String,
    pub fallback: bool,
}

/// Build a tip request from client records, or from the store when the
/// client sent none
fn build_tip_request(
    state: &AppState,
    transactions: Option<Vec<Transaction>>,
    goals: Option<Vec<Goal>>,
    score: Option<u8>,
) -> Result<TipRequest, AppError> {
    let app = state.app()?;
    if transactions.is_none() && goals.is_none() {
        let mut request = app.tip_request()?;
        if score.is_some() {
            request.score = score;
        }
        return Ok(request);
    }

    let transactions = match transactions {
        Some(t) => t,
        None => app.list_transactions()?,
    };
    let goals = match goals {
        Some(g) => g,
        None => app.list_goals()?,
    };
    let now = app.clock().now();
    let score = score.unwrap_or_else(|| compute_score(&transactions, &goals, &[], now));
    Ok(TipRequest::from_records(
        &transactions,
        &goals,
        Some(score),
        now,
    ))
}

/// POST /api/mentor-tip - One short tip for the user's finances
pub async fn mentor_tip(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<MentorTipResponse>, AppError> {
    let req: MentorTipRequest = if body.is_empty() {
        MentorTipRequest::default()
    } else {
        parse_body(&body)?
    };

    let request = build_tip_request(&state, req.transactions, req.goals, None)?;
    let generated = generate_tip_with_fallback(&state.tips, &request).await;
    info!(
        model = %generated.model,
        fallback = generated.fallback,
        "Mentor tip served"
    );

    Ok(Json(MentorTipResponse {
        success: true,
        tip: generated.tip,
        model: generated.model,
        fallback: generated.fallback,
        context: request.context,
    }))
}

/// POST /api/chatbot - Answer a question with the user's finances as context
pub async fn chatbot(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChatbotResponse>, AppError> {
    let req: ChatbotRequest = parse_body(&body)?;
    let message = req.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::bad_request("Message is required"));
    }
    if message.len() > MAX_MESSAGE_LEN {
        return Err(AppError::bad_request(&format!(
            "Message too long (max {} characters)",
            MAX_MESSAGE_LEN
        )));
    }

    let tip = build_tip_request(&state, req.transactions, req.goals, req.score)?;
    let chat = ChatRequest { message, tip };

    let (reply, model, fallback) = match state.tips.chat_reply(&chat).await {
        Ok(reply) if !reply.trim().is_empty() => {
            (reply, state.tips.model().to_string(), false)
        }
        outcome => {
            if let Err(e) = outcome {
                warn!(model = state.tips.model(), error = %e, "Chat reply failed, using rules");
            }
            let rules = TipClient::rules();
            let reply = rules.chat_reply(&chat).await?;
            (reply, rules.model().to_string(), true)
        }
    };

    Ok(Json(ChatbotResponse {
        success: true,
        reply: smartcents_core::tips::clean_tip_text(&reply),
        model,
        fallback,
    }))
}
