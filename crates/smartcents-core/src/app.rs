//! Application context
//!
//! [`SmartCents`] owns the store, clock, random source and config, and is the
//! single entry point for every user operation. Mutations that can move the
//! score recompute it and append a history snapshot before returning.

use std::sync::Arc;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::{goal_prediction, FinancialSummary, GoalPrediction};
use crate::challenges::{self, CompletionOutcome};
use crate::changelog::{build_change_log, ChangeLog};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::history::ScoreHistory;
use crate::models::{ChallengeInstance, Goal, NewGoal, NewTransaction, Transaction};
use crate::score::{score_breakdown, ScoreBreakdown};
use crate::store::Store;
use crate::tips::TipRequest;

/// Result of recomputing the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreUpdate {
    /// Most recent recorded score before this update
    pub previous: Option<u8>,
    pub score: u8,
    pub delta: i32,
}

/// Result of adding money to a goal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgressOutcome {
    pub goal: Goal,
    pub added: f64,
    /// The goal crossed its target with this deposit
    pub just_completed: bool,
}

impl GoalProgressOutcome {
    pub fn message(&self) -> String {
        if self.just_completed {
            format!("Congratulations! Your goal \"{}\" has been completed!", self.goal.name)
        } else {
            format!("Added ${:.2} to your goal!", self.added)
        }
    }
}

/// A goal with its completion estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalForecast {
    pub goal_id: String,
    pub name: String,
    pub remaining: f64,
    pub prediction: GoalPrediction,
    pub message: String,
}

/// The SmartCents application
pub struct SmartCents<S: Store> {
    store: S,
    config: Config,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
}

impl<S: Store> SmartCents<S> {
    /// Wall clock and an OS-seeded random source
    pub fn new(store: S, config: Config) -> Self {
        Self::with_parts(
            store,
            config,
            Arc::new(SystemClock),
            Box::new(StdRng::from_entropy()),
        )
    }

    pub fn with_parts(
        store: S,
        config: Config,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            store,
            config,
            clock,
            rng,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ---- Transactions ----

    /// Validate, store and score a new transaction
    pub fn add_transaction(&mut self, new: NewTransaction) -> Result<Transaction> {
        new.validate()?;
        let now = self.clock.now();
        let tx = Transaction {
            id: 0,
            transaction_type: new.transaction_type,
            amount: new.amount,
            category: new.category.trim().to_string(),
            date: new.date.unwrap_or_else(|| self.today()),
            note: new.note.filter(|n| !n.trim().is_empty()),
            timestamp: now,
        };
        let stored = self.store.insert_transaction(&tx)?;
        info!(
            id = stored.id,
            kind = %stored.transaction_type,
            amount = stored.amount,
            category = %stored.category,
            "Transaction added"
        );
        self.update_score()?;
        Ok(stored)
    }

    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.store.list_transactions()
    }

    /// Remove every transaction, returning how many were removed
    pub fn reset_transactions(&mut self) -> Result<usize> {
        let removed = self.store.clear_transactions()?;
        info!(removed, "Transactions reset");
        self.update_score()?;
        Ok(removed)
    }

    // ---- Goals ----

    pub fn add_goal(&mut self, new: NewGoal) -> Result<Goal> {
        new.validate()?;
        let now = self.clock.now();
        let goal = Goal {
            id: self.next_goal_id(now.timestamp_millis())?,
            name: new.name.trim().to_string(),
            target_amount: new.target_amount,
            saved_amount: 0.0,
            target_date: new.target_date,
            note: new.note.filter(|n| !n.trim().is_empty()),
            timestamp: now,
        };
        self.store.insert_goal(&goal)?;
        info!(id = %goal.id, name = %goal.name, target = goal.target_amount, "Goal added");
        self.update_score()?;
        Ok(goal)
    }

    /// Millisecond timestamp ids, bumped past any id already in use
    fn next_goal_id(&self, millis: i64) -> Result<String> {
        let mut candidate = millis;
        while self.store.get_goal(&candidate.to_string())?.is_some() {
            candidate += 1;
        }
        Ok(candidate.to_string())
    }

    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        self.store.list_goals()
    }

    /// Add a positive amount to a goal's savings
    pub fn add_goal_progress(&mut self, id: &str, amount: f64) -> Result<GoalProgressOutcome> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "Progress amount must be positive, got {}",
                amount
            )));
        }

        let mut goal = self
            .store
            .get_goal(id)?
            .ok_or_else(|| Error::NotFound(format!("Goal {}", id)))?;
        let was_completed = goal.is_completed();
        goal.saved_amount += amount;
        self.store.update_goal_saved(id, goal.saved_amount)?;

        let just_completed = !was_completed && goal.is_completed();
        info!(
            id = %goal.id,
            added = amount,
            saved = goal.saved_amount,
            target = goal.target_amount,
            just_completed,
            "Goal progress added"
        );
        self.update_score()?;

        Ok(GoalProgressOutcome {
            goal,
            added: amount,
            just_completed,
        })
    }

    pub fn delete_goal(&mut self, id: &str) -> Result<()> {
        if !self.store.delete_goal(id)? {
            return Err(Error::NotFound(format!("Goal {}", id)));
        }
        info!(id, "Goal deleted");
        self.update_score()?;
        Ok(())
    }

    pub fn reset_goals(&mut self) -> Result<usize> {
        let removed = self.store.clear_goals()?;
        info!(removed, "Goals reset");
        self.update_score()?;
        Ok(removed)
    }

    /// Completion estimate for every active goal
    pub fn goal_predictions(&self) -> Result<Vec<GoalForecast>> {
        let transactions = self.store.list_transactions()?;
        let forecasts = self
            .store
            .list_goals()?
            .into_iter()
            .filter(Goal::is_active)
            .map(|goal| {
                let prediction = goal_prediction(&goal, &transactions);
                GoalForecast {
                    remaining: goal.remaining(),
                    message: prediction.message(),
                    goal_id: goal.id,
                    name: goal.name,
                    prediction,
                }
            })
            .collect();
        Ok(forecasts)
    }

    // ---- Challenges ----

    /// Today's set, drawing it on first access
    pub fn todays_challenges(&mut self) -> Result<Vec<ChallengeInstance>> {
        let today = self.today();
        challenges::todays_challenges(&self.store, today, self.rng.as_mut())
    }

    /// Advance one of today's challenges; completion updates the score
    pub fn complete_challenge(&mut self, id: &str) -> Result<CompletionOutcome> {
        let today = self.today();
        challenges::todays_challenges(&self.store, today, self.rng.as_mut())?;
        let outcome = challenges::complete_challenge(&self.store, today, id)?;
        if outcome.just_completed() {
            self.update_score()?;
        }
        Ok(outcome)
    }

    pub fn reset_challenges(&mut self) -> Result<()> {
        let today = self.today();
        challenges::reset_challenges(&self.store, today)?;
        self.update_score()?;
        Ok(())
    }

    // ---- Score ----

    /// Breakdown of the score from current records
    ///
    /// Only counts a challenge set already drawn for today; never draws one.
    pub fn score_breakdown(&self) -> Result<ScoreBreakdown> {
        let transactions = self.store.list_transactions()?;
        let goals = self.store.list_goals()?;
        let challenges = self.store.load_challenges(self.today())?.unwrap_or_default();
        Ok(score_breakdown(
            &transactions,
            &goals,
            &challenges,
            self.clock.now(),
        ))
    }

    pub fn current_score(&self) -> Result<u8> {
        Ok(self.score_breakdown()?.score)
    }

    /// Recompute the score and record a history snapshot
    pub fn update_score(&mut self) -> Result<ScoreUpdate> {
        let score = self.current_score()?;
        let now = self.clock.now();

        let mut history = ScoreHistory::load(&self.store)?;
        let previous = history.minute.last_key_value().map(|(_, score)| *score);
        history.record_snapshot(score, now, &self.config.history);
        history.save(&self.store)?;

        let delta = previous.map_or(0, |p| i32::from(score) - i32::from(p));
        if delta != 0 {
            info!(score, delta, "Score changed");
        } else {
            debug!(score, "Score unchanged");
        }

        Ok(ScoreUpdate {
            previous,
            score,
            delta,
        })
    }

    pub fn history(&self) -> Result<ScoreHistory> {
        ScoreHistory::load(&self.store)
    }

    /// Most recent score changes with inferred reasons
    pub fn change_log(&self) -> Result<ChangeLog> {
        let history = ScoreHistory::load(&self.store)?;
        let transactions = self.store.list_transactions()?;
        Ok(build_change_log(&history, &transactions, self.clock.now()))
    }

    // ---- Analysis ----

    pub fn financial_summary(&self) -> Result<FinancialSummary> {
        let transactions = self.store.list_transactions()?;
        let goals = self.store.list_goals()?;
        Ok(FinancialSummary::from_records(
            &transactions,
            &goals,
            self.clock.now(),
        ))
    }

    /// Everything a tip generator needs, built from stored records
    pub fn tip_request(&self) -> Result<TipRequest> {
        let transactions = self.store.list_transactions()?;
        let goals = self.store.list_goals()?;
        let score = self.current_score()?;
        Ok(TipRequest::from_records(
            &transactions,
            &goals,
            Some(score),
            self.clock.now(),
        ))
    }
}
