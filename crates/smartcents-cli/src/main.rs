//! SmartCents CLI - Teen finance tracker
//!
//! Usage:
//!   smartcents init                          Initialize database
//!   smartcents add income 20 allowance       Record income
//!   smartcents add expense 4.50 snacks       Record an expense
//!   smartcents score --explain               Show the independence score
//!   smartcents challenges                    Show today's challenges
//!   smartcents serve --port 3001             Start web server

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use smartcents_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Commands::Init = cli.command {
        return commands::cmd_init(&cli.db, cli.no_encrypt);
    }
    if let Commands::Serve { port, host } = &cli.command {
        return commands::cmd_serve(&cli.db, cli.no_encrypt, config, host.as_deref(), *port)
            .await;
    }

    let mut app = commands::open_app(&cli.db, cli.no_encrypt, config)?;

    match cli.command {
        Commands::Init | Commands::Serve { .. } => Ok(()),
        Commands::Add { action } => match action {
            AddAction::Income {
                amount,
                category,
                date,
                note,
            } => commands::cmd_add_income(&mut app, amount, &category, date, note.as_deref()),
            AddAction::Expense {
                amount,
                category,
                date,
                note,
            } => commands::cmd_add_expense(&mut app, amount, &category, date, note.as_deref()),
        },
        Commands::Transactions { action } => match action {
            None | Some(TransactionsAction::List) => commands::cmd_transactions_list(&app),
            Some(TransactionsAction::Reset) => commands::cmd_transactions_reset(&mut app),
        },
        Commands::Goals { action } => match action {
            None | Some(GoalsAction::List) => commands::cmd_goals_list(&app),
            Some(GoalsAction::Add {
                name,
                target,
                date,
                note,
            }) => commands::cmd_goals_add(&mut app, &name, target, date, note.as_deref()),
            Some(GoalsAction::Progress { id, amount }) => {
                commands::cmd_goals_progress(&mut app, &id, amount)
            }
            Some(GoalsAction::Delete { id }) => commands::cmd_goals_delete(&mut app, &id),
            Some(GoalsAction::Reset) => commands::cmd_goals_reset(&mut app),
            Some(GoalsAction::Predict) => commands::cmd_goals_predict(&app),
        },
        Commands::Score { explain, json } => commands::cmd_score(&app, explain, json),
        Commands::Log => commands::cmd_log(&app),
        Commands::Challenges { action } => match action {
            None | Some(ChallengesAction::List) => commands::cmd_challenges_list(&mut app),
            Some(ChallengesAction::Complete { id }) => {
                commands::cmd_challenges_complete(&mut app, &id)
            }
            Some(ChallengesAction::Reset) => commands::cmd_challenges_reset(&mut app),
        },
        Commands::Summary { json } => commands::cmd_summary(&app, json),
        Commands::Tip => {
            let tips = smartcents_core::TipClient::from_config(&app.config().tips);
            commands::cmd_tip(&app, &tips).await
        }
    }
}
