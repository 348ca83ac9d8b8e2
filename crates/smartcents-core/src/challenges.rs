//! Daily challenges
//!
//! Each calendar day gets three challenges drawn from a fixed catalog. The
//! draw happens on first access and is persisted, so every later call that
//! day sees the same three. Progress only moves forward, and a completed
//! challenge stays completed until the day's set is explicitly reset.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::RngCore;
use serde::Serialize;

use crate::error::Result;
use crate::models::{ChallengeInstance, Difficulty, IncrementStrategy};
use crate::store::Store;

/// Challenges drawn per day
pub const DAILY_CHALLENGE_COUNT: usize = 3;

/// A catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub target: u32,
    pub difficulty: Difficulty,
    pub points: u32,
    pub action: &'static str,
    pub increment: IncrementStrategy,
}

impl ChallengeTemplate {
    /// A fresh, untouched instance of this challenge for `date`
    pub fn instantiate(&self, date: NaiveDate) -> ChallengeInstance {
        ChallengeInstance {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            target: self.target,
            difficulty: self.difficulty,
            points: self.points,
            kind: "daily".to_string(),
            action: self.action.to_string(),
            increment: self.increment,
            progress: 0,
            completed: false,
            date,
        }
    }
}

#[allow(clippy::too_many_arguments)]
const fn template(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    target: u32,
    difficulty: Difficulty,
    points: u32,
    action: &'static str,
    increment: IncrementStrategy,
) -> ChallengeTemplate {
    ChallengeTemplate {
        id,
        name,
        description,
        target,
        difficulty,
        points,
        action,
        increment,
    }
}

use Difficulty::{Easy, Hard, Medium};
use IncrementStrategy::{BinaryComplete, FixedIncrement};

pub const CATALOG: [ChallengeTemplate; 12] = [
    template("no-spend-day", "No-Spend Day", "Go one full day without spending any money", 1, Easy, 2, "Mark Completed", BinaryComplete),
    template("save-small", "Save $2 Today", "Put aside $2 from your allowance or income", 2, Easy, 2, "Add $1 Saved", FixedIncrement(1)),
    template("track-expenses", "Track 3 Expenses", "Log at least 3 expenses in your tracker", 3, Easy, 1, "Log Transaction", BinaryComplete),
    template("budget-check", "Check Your Budget", "Review your spending from yesterday", 1, Easy, 1, "Mark Reviewed", BinaryComplete),
    template("save-medium", "Save $5 Today", "Put aside $5 from your allowance or income", 5, Medium, 4, "Add $1 Saved", FixedIncrement(1)),
    template("no-fun-spending", "No Fun Spending", "Avoid spending on entertainment today", 1, Medium, 3, "Mark Completed", BinaryComplete),
    template("cook-meal", "Cook a Meal", "Prepare a meal at home instead of eating out", 1, Medium, 3, "Mark Completed", BinaryComplete),
    template("find-deal", "Find a Deal", "Find and use a coupon or discount", 1, Medium, 3, "Mark Completed", BinaryComplete),
    template("save-hard", "Save $10 Today", "Put aside $10 from your allowance or income", 10, Hard, 7, "Add $2 Saved", FixedIncrement(2)),
    template("no-spend-weekend", "Weekend No-Spend", "Go the entire weekend without spending", 1, Hard, 8, "Mark Completed", BinaryComplete),
    template("side-hustle", "Earn Extra Money", "Find a way to earn at least $5 today", 1, Hard, 6, "Mark Completed", BinaryComplete),
    template("sell-item", "Sell Something", "Sell an item you no longer need", 1, Hard, 6, "Mark Completed", BinaryComplete),
];

/// Look up a catalog entry by id
pub fn find_template(id: &str) -> Option<&'static ChallengeTemplate> {
    CATALOG.iter().find(|t| t.id == id)
}

/// Result of a "complete" action on one of today's challenges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// No such challenge in today's set (or no set yet)
    NotFound,
    /// Already completed; nothing changed
    AlreadyCompleted,
    /// Moved forward but not done yet
    Progressed { progress: u32, target: u32 },
    /// Just crossed the target
    Completed { points: u32 },
}

impl CompletionOutcome {
    pub fn just_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

impl ChallengeInstance {
    /// Apply one action. Returns the outcome; never moves progress backward.
    pub fn advance(&mut self) -> CompletionOutcome {
        if self.completed {
            return CompletionOutcome::AlreadyCompleted;
        }

        let next = match self.increment {
            IncrementStrategy::FixedIncrement(step) => {
                self.progress.saturating_add(step).min(self.target)
            }
            IncrementStrategy::BinaryComplete => self.target,
        };
        self.progress = self.progress.max(next);

        if self.progress >= self.target {
            self.completed = true;
            CompletionOutcome::Completed {
                points: self.points,
            }
        } else {
            CompletionOutcome::Progressed {
                progress: self.progress,
                target: self.target,
            }
        }
    }
}

/// Today's three challenges, drawing and persisting them on first access
pub fn todays_challenges<S: Store + ?Sized>(
    store: &S,
    date: NaiveDate,
    rng: &mut dyn RngCore,
) -> Result<Vec<ChallengeInstance>> {
    if let Some(existing) = store.load_challenges(date)? {
        return Ok(existing);
    }

    let mut picks: Vec<&ChallengeTemplate> = CATALOG.iter().collect();
    picks.shuffle(rng);
    let todays: Vec<ChallengeInstance> = picks
        .into_iter()
        .take(DAILY_CHALLENGE_COUNT)
        .map(|t| t.instantiate(date))
        .collect();

    store.save_challenges(date, &todays)?;
    tracing::info!(
        date = %date,
        challenges = ?todays.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
        "Drew daily challenges"
    );
    Ok(todays)
}

/// Advance one of the day's challenges
///
/// Only touches an existing set; if nothing was drawn for `date` the result
/// is [`CompletionOutcome::NotFound`].
pub fn complete_challenge<S: Store + ?Sized>(
    store: &S,
    date: NaiveDate,
    id: &str,
) -> Result<CompletionOutcome> {
    let Some(mut challenges) = store.load_challenges(date)? else {
        return Ok(CompletionOutcome::NotFound);
    };
    let Some(challenge) = challenges.iter_mut().find(|c| c.id == id) else {
        return Ok(CompletionOutcome::NotFound);
    };

    let outcome = challenge.advance();
    if outcome == CompletionOutcome::AlreadyCompleted {
        return Ok(outcome);
    }

    store.save_challenges(date, &challenges)?;
    match outcome {
        CompletionOutcome::Completed { points } => {
            tracing::info!(date = %date, challenge = id, points, "Challenge completed");
        }
        CompletionOutcome::Progressed { progress, target } => {
            tracing::debug!(date = %date, challenge = id, progress, target, "Challenge progressed");
        }
        _ => {}
    }
    Ok(outcome)
}

/// Forget the day's draw; the next access draws again
pub fn reset_challenges<S: Store + ?Sized>(store: &S, date: NaiveDate) -> Result<()> {
    store.remove_challenges(date)?;
    tracing::info!(date = %date, "Daily challenges reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_catalog_shape() {
        assert_eq!(CATALOG.len(), 12);
        let ids: HashSet<_> = CATALOG.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 12);

        let save_hard = find_template("save-hard").unwrap();
        assert_eq!(save_hard.increment, FixedIncrement(2));
        assert_eq!(save_hard.points, 7);
        assert_eq!(find_template("save-small").unwrap().increment, FixedIncrement(1));
        assert_eq!(find_template("cook-meal").unwrap().increment, BinaryComplete);
        assert!(find_template("nope").is_none());
    }

    #[test]
    fn test_new_day_draws_three_fresh_challenges() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(7);

        let todays = todays_challenges(&store, day(1), &mut rng).unwrap();
        assert_eq!(todays.len(), 3);
        let ids: HashSet<_> = todays.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids.len(), 3);
        for c in &todays {
            assert_eq!(c.progress, 0);
            assert!(!c.completed);
            assert_eq!(c.date, day(1));
            assert!(find_template(&c.id).is_some());
        }
    }

    #[test]
    fn test_draw_is_stable_within_a_day() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(1);
        let first = todays_challenges(&store, day(2), &mut rng).unwrap();

        // A different random source must not change an existing draw
        let mut other = StdRng::seed_from_u64(99);
        let second = todays_challenges(&store, day(2), &mut other).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_same_seed_same_draw() {
        let a = todays_challenges(&MemoryStore::new(), day(3), &mut StdRng::seed_from_u64(42)).unwrap();
        let b = todays_challenges(&MemoryStore::new(), day(3), &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fixed_increment_progress() {
        let mut c = find_template("save-hard").unwrap().instantiate(day(1));
        let mut seen = Vec::new();
        loop {
            let before = c.progress;
            let outcome = c.advance();
            assert!(c.progress >= before);
            seen.push(outcome);
            if c.completed {
                break;
            }
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], CompletionOutcome::Progressed { progress: 2, target: 10 });
        assert_eq!(seen[4], CompletionOutcome::Completed { points: 7 });
        assert_eq!(c.progress, 10);

        assert_eq!(c.advance(), CompletionOutcome::AlreadyCompleted);
        assert_eq!(c.progress, 10);
        assert!(c.completed);
    }

    #[test]
    fn test_fixed_increment_caps_at_target() {
        let mut c = find_template("save-hard").unwrap().instantiate(day(1));
        c.progress = 9;
        assert_eq!(c.advance(), CompletionOutcome::Completed { points: 7 });
        assert_eq!(c.progress, 10);
    }

    #[test]
    fn test_binary_completes_in_one_step() {
        let mut c = find_template("track-expenses").unwrap().instantiate(day(1));
        assert_eq!(c.advance(), CompletionOutcome::Completed { points: 1 });
        assert_eq!(c.progress, 3);
    }

    #[test]
    fn test_complete_persists_and_is_idempotent() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(5);
        let todays = todays_challenges(&store, day(4), &mut rng).unwrap();
        let id = todays[0].id.clone();

        // Drive it to completion
        let mut outcome = complete_challenge(&store, day(4), &id).unwrap();
        while !outcome.just_completed() {
            outcome = complete_challenge(&store, day(4), &id).unwrap();
        }

        let stored = store.load_challenges(day(4)).unwrap().unwrap();
        let done = stored.iter().find(|c| c.id == id).unwrap();
        assert!(done.completed);
        assert_eq!(done.progress, done.target);

        assert_eq!(
            complete_challenge(&store, day(4), &id).unwrap(),
            CompletionOutcome::AlreadyCompleted
        );
    }

    #[test]
    fn test_complete_without_draw_or_unknown_id() {
        let store = MemoryStore::new();
        assert_eq!(
            complete_challenge(&store, day(5), "cook-meal").unwrap(),
            CompletionOutcome::NotFound
        );

        todays_challenges(&store, day(5), &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(
            complete_challenge(&store, day(5), "does-not-exist").unwrap(),
            CompletionOutcome::NotFound
        );
    }

    #[test]
    fn test_reset_allows_new_draw() {
        let store = MemoryStore::new();
        todays_challenges(&store, day(6), &mut StdRng::seed_from_u64(11)).unwrap();
        reset_challenges(&store, day(6)).unwrap();
        assert!(store.load_challenges(day(6)).unwrap().is_none());

        let redrawn = todays_challenges(&store, day(6), &mut StdRng::seed_from_u64(12)).unwrap();
        assert_eq!(redrawn.len(), 3);
        assert!(redrawn.iter().all(|c| c.progress == 0 && !c.completed));
    }

    #[test]
    fn test_days_are_independent() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(8);
        let monday = todays_challenges(&store, day(10), &mut rng).unwrap();
        let id = monday[0].id.clone();
        complete_challenge(&store, day(10), &id).unwrap();

        let tuesday = todays_challenges(&store, day(11), &mut rng).unwrap();
        assert!(tuesday.iter().all(|c| c.progress == 0 && c.date == day(11)));
    }
}
