//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, open_app)
//! - `transactions` - Add, list and reset transactions
//! - `goals` - Savings goal commands (list, add, progress, delete, reset, predict)
//! - `score` - Score, change log and summary
//! - `challenges` - Daily challenge commands
//! - `tips` - Mentor tip
//! - `serve` - Web server command

pub mod challenges;
pub mod core;
pub mod goals;
pub mod score;
pub mod serve;
pub mod tips;
pub mod transactions;

// Re-export command functions for main.rs
pub use challenges::*;
pub use core::*;
pub use goals::*;
pub use score::*;
pub use serve::*;
pub use tips::*;
pub use transactions::*;

use smartcents_core::{Database, SmartCents};

/// The application over the on-disk database
pub type App = SmartCents<Database>;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Text progress bar, `width` cells wide
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
