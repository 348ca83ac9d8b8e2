//! [`Store`] over SQLite

use chrono::NaiveDate;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{ChallengeInstance, Goal, Granularity, ScoreSnapshot, Transaction};
use crate::store::Store;

impl Store for Database {
    fn list_transactions(&self) -> Result<Vec<Transaction>> {
        Database::list_transactions(self)
    }

    fn insert_transaction(&self, tx: &Transaction) -> Result<Transaction> {
        let id = Database::insert_transaction(self, tx)?;
        Database::get_transaction(self, id)?
            .ok_or_else(|| Error::NotFound(format!("Transaction {} after insert", id)))
    }

    fn clear_transactions(&self) -> Result<usize> {
        Database::clear_transactions(self)
    }

    fn list_goals(&self) -> Result<Vec<Goal>> {
        Database::list_goals(self)
    }

    fn get_goal(&self, id: &str) -> Result<Option<Goal>> {
        Database::get_goal(self, id)
    }

    fn insert_goal(&self, goal: &Goal) -> Result<()> {
        Database::insert_goal(self, goal)
    }

    fn update_goal_saved(&self, id: &str, saved_amount: f64) -> Result<bool> {
        Database::update_goal_saved(self, id, saved_amount)
    }

    fn delete_goal(&self, id: &str) -> Result<bool> {
        Database::delete_goal(self, id)
    }

    fn clear_goals(&self) -> Result<usize> {
        Database::clear_goals(self)
    }

    fn load_challenges(&self, date: NaiveDate) -> Result<Option<Vec<ChallengeInstance>>> {
        Database::load_challenges(self, date)
    }

    fn save_challenges(&self, date: NaiveDate, challenges: &[ChallengeInstance]) -> Result<()> {
        Database::save_challenges(self, date, challenges)
    }

    fn remove_challenges(&self, date: NaiveDate) -> Result<()> {
        Database::remove_challenges(self, date)
    }

    fn load_series(&self, granularity: Granularity) -> Result<Vec<ScoreSnapshot>> {
        Database::load_series(self, granularity)
    }

    fn save_series(&self, granularity: Granularity, snapshots: &[ScoreSnapshot]) -> Result<()> {
        Database::save_series(self, granularity, snapshots)
    }

    fn save_history(&self, hourly: &[ScoreSnapshot], minute: &[ScoreSnapshot]) -> Result<()> {
        Database::save_history(self, hourly, minute)
    }
}
