//! Savings goal command implementations

use anyhow::Result;
use chrono::NaiveDate;
use smartcents_core::NewGoal;

use super::{progress_bar, truncate, App};

pub fn cmd_goals_list(app: &App) -> Result<()> {
    let goals = app.list_goals()?;

    if goals.is_empty() {
        println!("No goals yet. Create one with:");
        println!("  smartcents goals add \"New bike\" 150");
        return Ok(());
    }

    println!();
    println!("🎯 Goals");
    println!("   ─────────────────────────────────────────────────────────────");

    for goal in goals {
        let status = if goal.is_completed() { "🎉" } else { "  " };
        println!(
            "   {} [{}] {:<24} {} {:>5.1}%  ${:.2} / ${:.2}",
            status,
            goal.id,
            truncate(&goal.name, 24),
            progress_bar(goal.progress_percent(), 20),
            goal.progress_percent(),
            goal.saved_amount,
            goal.target_amount
        );
        if let Some(date) = goal.target_date {
            println!("        Target date: {}", date);
        }
    }

    Ok(())
}

pub fn cmd_goals_add(
    app: &mut App,
    name: &str,
    target: f64,
    date: Option<NaiveDate>,
    note: Option<&str>,
) -> Result<()> {
    let mut new = NewGoal::new(name, target);
    new.target_date = date;
    new.note = note.map(str::to_string);

    let goal = app.add_goal(new)?;
    println!(
        "✅ Created goal \"{}\" (${:.2}) with ID {}",
        goal.name, goal.target_amount, goal.id
    );
    Ok(())
}

pub fn cmd_goals_progress(app: &mut App, id: &str, amount: f64) -> Result<()> {
    let outcome = app.add_goal_progress(id, amount)?;
    if outcome.just_completed {
        println!("🎉 {}", outcome.message());
    } else {
        println!("✅ {}", outcome.message());
    }
    println!(
        "   {} {:.1}%",
        progress_bar(outcome.goal.progress_percent(), 20),
        outcome.goal.progress_percent()
    );
    Ok(())
}

pub fn cmd_goals_delete(app: &mut App, id: &str) -> Result<()> {
    app.delete_goal(id)?;
    println!("🗑️  Deleted goal {}", id);
    Ok(())
}

pub fn cmd_goals_reset(app: &mut App) -> Result<()> {
    let removed = app.reset_goals()?;
    println!("🗑️  Removed {} goal(s)", removed);
    Ok(())
}

pub fn cmd_goals_predict(app: &App) -> Result<()> {
    let forecasts = app.goal_predictions()?;

    if forecasts.is_empty() {
        println!("No active goals to predict.");
        return Ok(());
    }

    println!();
    println!("🔮 Goal Predictions");
    println!("   ─────────────────────────────────────────────────────────────");
    for forecast in forecasts {
        println!(
            "   {} (${:.2} to go)",
            truncate(&forecast.name, 30),
            forecast.remaining
        );
        println!("      {}", forecast.message);
    }

    Ok(())
}
