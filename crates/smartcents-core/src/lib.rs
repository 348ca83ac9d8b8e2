//! SmartCents Core Library
//!
//! Shared functionality for the SmartCents teen finance tracker:
//! - Financial independence score with an itemized breakdown
//! - Daily challenges drawn from a fixed catalog
//! - Hourly and minute score history with a reconstructed change log
//! - Financial summaries, rule-based advice and goal predictions
//! - Pluggable mentor tip generators (OpenAI-compatible, Ollama, local rules)
//! - SQLite storage with optional SQLCipher encryption

pub mod analysis;
pub mod app;
pub mod challenges;
pub mod changelog;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod models;
pub mod score;
pub mod store;
pub mod tips;

/// Test utilities including a mock chat completion server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analysis::{goal_prediction, FinancialSummary, GoalPrediction, SpendingTrend};
pub use app::{GoalForecast, GoalProgressOutcome, ScoreUpdate, SmartCents};
pub use challenges::{ChallengeTemplate, CompletionOutcome, CATALOG};
pub use changelog::{build_change_log, ChangeLog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, HistoryConfig, ServerSettings, TipsConfig};
pub use db::Database;
pub use error::{Error, Result};
pub use history::ScoreHistory;
pub use models::*;
pub use score::{compute_score, score_breakdown, InactivityPenalty, ScoreBreakdown};
pub use store::{MemoryStore, Store};
pub use tips::{
    generate_tip_with_fallback, ChatRequest, GeneratedTip, TipClient, TipGenerator, TipRequest,
};
