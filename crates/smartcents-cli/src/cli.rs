//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// SmartCents - Build money habits, one day at a time
#[derive(Parser)]
#[command(name = "smartcents")]
#[command(about = "Teen finance tracker with an independence score and daily challenges", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "smartcents.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set SMARTCENTS_DB_KEY environment variable with your passphrase.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Config file (defaults to SMARTCENTS_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Record income or an expense
    Add {
        #[command(subcommand)]
        action: AddAction,
    },

    /// Manage transactions (list, reset)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Manage savings goals
    Goals {
        #[command(subcommand)]
        action: Option<GoalsAction>,
    },

    /// Show the financial independence score
    Score {
        /// Show how each component contributes
        #[arg(long)]
        explain: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent score changes and their reasons
    Log,

    /// Today's challenges
    Challenges {
        #[command(subcommand)]
        action: Option<ChallengesAction>,
    },

    /// Show a financial summary
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Get a mentor tip for your finances
    Tip,

    /// Start the web server
    Serve {
        /// Port to listen on (defaults to the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to the config file)
        #[arg(long)]
        host: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AddAction {
    /// Money coming in
    Income {
        /// Amount (positive)
        amount: f64,
        /// Category (e.g., allowance, job, gift)
        category: String,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Optional note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Money going out
    Expense {
        /// Amount (positive)
        amount: f64,
        /// Category (e.g., food, games, clothes)
        category: String,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Optional note
        #[arg(short, long)]
        note: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List all transactions
    List,
    /// Delete every transaction
    Reset,
}

#[derive(Subcommand)]
pub enum GoalsAction {
    /// List goals with progress
    List,

    /// Create a savings goal
    Add {
        /// Goal name
        name: String,
        /// Target amount
        target: f64,
        /// Target date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Optional note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Add savings to a goal
    Progress {
        /// Goal ID
        id: String,
        /// Amount to add (positive)
        amount: f64,
    },

    /// Delete a goal
    Delete {
        /// Goal ID
        id: String,
    },

    /// Delete every goal
    Reset,

    /// Estimate when each active goal will be reached
    Predict,
}

#[derive(Subcommand)]
pub enum ChallengesAction {
    /// Show today's challenges
    List,

    /// Advance a challenge
    Complete {
        /// Challenge ID (e.g., no-spend-day)
        id: String,
    },

    /// Draw a fresh set for today
    Reset,
}
