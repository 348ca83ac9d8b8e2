//! Score, change log and summary command implementations

use anyhow::Result;
use smartcents_core::ChangeLog;

use super::{progress_bar, App};

fn signed(points: i32) -> String {
    match points {
        p if p > 0 => format!("\x1b[32m+{}\x1b[0m", p),
        p if p < 0 => format!("\x1b[31m{}\x1b[0m", p),
        _ => "0".to_string(),
    }
}

pub fn cmd_score(app: &App, explain: bool, json: bool) -> Result<()> {
    let breakdown = app.score_breakdown()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
        return Ok(());
    }

    println!();
    println!("💰 Independence Score: {}/100", breakdown.score);
    println!("   {}", progress_bar(f64::from(breakdown.score), 30));

    if !explain {
        return Ok(());
    }

    println!();
    println!("   ─────────────────────────────────────────────");
    match breakdown.savings_rate {
        Some(rate) => println!(
            "   Savings rate ({:.1}%)          {:>4}",
            rate,
            signed(breakdown.savings_rate_points)
        ),
        None => println!(
            "   Savings rate (no income)      {:>4}",
            signed(breakdown.savings_rate_points)
        ),
    }
    println!(
        "   Spending categories ({})       {:>4}",
        breakdown.category_count,
        signed(breakdown.category_points)
    );
    println!(
        "   Savings goals                 {:>4}",
        signed(breakdown.goal_points)
    );
    println!(
        "   Saving in the last 30 days    {:>4}",
        signed(breakdown.recent_savings_points)
    );
    println!(
        "   Transaction volume            {:>4}",
        signed(breakdown.volume_points)
    );
    println!(
        "   Daily challenges              {:>4}",
        signed(breakdown.challenge_points)
    );
    for penalty in &breakdown.inactivity {
        println!("   {}", penalty.description());
    }
    println!("   ─────────────────────────────────────────────");
    if breakdown.raw_total != i32::from(breakdown.score) {
        println!(
            "   Raw total {} clamped to {}",
            breakdown.raw_total, breakdown.score
        );
    }

    Ok(())
}

pub fn cmd_log(app: &App) -> Result<()> {
    match app.change_log()? {
        ChangeLog::NoData => {
            println!("No score history yet. Add a transaction to get started.");
        }
        ChangeLog::InitialScore { score, at } => {
            println!("📈 Initial score: {} (recorded {})", score, at);
        }
        ChangeLog::Entries { entries } if entries.is_empty() => {
            println!("📈 No score changes yet.");
        }
        ChangeLog::Entries { entries } => {
            println!();
            println!("📈 Recent Score Changes");
            println!("   ─────────────────────────────────────────────────────────────");
            for entry in entries {
                println!(
                    "   {} │ {:>3} → {:>3} ({}) │ {}",
                    entry.timestamp,
                    entry.previous_score,
                    entry.score,
                    signed(entry.delta),
                    entry.reason
                );
            }
        }
    }
    Ok(())
}

pub fn cmd_summary(app: &App, json: bool) -> Result<()> {
    let summary = app.financial_summary()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!("📊 Financial Summary");
    println!("   ─────────────────────────────────────────────");
    println!("   Income:         \x1b[32m${:.2}\x1b[0m", summary.total_income);
    println!("   Expenses:       \x1b[31m${:.2}\x1b[0m", summary.total_expenses);
    println!("   Savings:        ${:.2}", summary.savings);
    if let Some(rate) = summary.savings_rate {
        println!("   Savings rate:   {:.1}%", rate);
    }
    println!("   Transactions:   {}", summary.transaction_count);
    println!(
        "   Goals:          {} active, {} completed",
        summary.active_goals, summary.completed_goals
    );
    println!(
        "   Last 7 days:    ${:.2} spent ({} vs. the week before)",
        summary.last_week_spending, summary.trend
    );

    if !summary.categories.is_empty() {
        println!();
        println!("   Spending by category:");
        for cat in &summary.categories {
            println!(
                "   {:<16} ${:>8.2}  {:>5.1}%",
                cat.category, cat.amount, cat.percent
            );
        }
    }

    Ok(())
}
