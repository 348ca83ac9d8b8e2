//! Daily challenge command implementations

use anyhow::{bail, Result};
use smartcents_core::CompletionOutcome;

use super::App;

pub fn cmd_challenges_list(app: &mut App) -> Result<()> {
    let challenges = app.todays_challenges()?;

    println!();
    println!("🏆 Today's Challenges");
    println!("   ─────────────────────────────────────────────────────────────");
    for c in challenges {
        let mark = if c.completed { "✅" } else { "⬜" };
        println!(
            "   {} {} [{}] ({}, {} pts) {}/{}",
            mark, c.name, c.id, c.difficulty, c.points, c.progress, c.target
        );
        println!("      {}", c.description);
    }

    Ok(())
}

pub fn cmd_challenges_complete(app: &mut App, id: &str) -> Result<()> {
    match app.complete_challenge(id)? {
        CompletionOutcome::NotFound => bail!("Challenge '{}' is not in today's set", id),
        CompletionOutcome::AlreadyCompleted => {
            println!("ℹ️  Challenge '{}' is already completed", id);
        }
        CompletionOutcome::Progressed { progress, target } => {
            println!("👍 Progress on '{}': {}/{}", id, progress, target);
        }
        CompletionOutcome::Completed { points } => {
            println!("🎉 Challenge '{}' completed! +{} points", id, points);
            println!("   Score: {}", app.current_score()?);
        }
    }
    Ok(())
}

pub fn cmd_challenges_reset(app: &mut App) -> Result<()> {
    app.reset_challenges()?;
    println!("🔄 Drew a fresh set of challenges for today");
    cmd_challenges_list(app)
}
