//! Persistence seam
//!
//! The engines never talk to SQLite directly; they go through [`Store`].
//! [`crate::db::Database`] is the durable implementation and [`MemoryStore`]
//! keeps everything in process memory.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::{ChallengeInstance, Goal, Granularity, ScoreSnapshot, Transaction};

/// Key-value style persistence for everything SmartCents remembers
///
/// Writes are last-writer-wins; a read after a write in the same process sees
/// the write.
pub trait Store: Send + Sync {
    /// All transactions, oldest first
    fn list_transactions(&self) -> Result<Vec<Transaction>>;
    /// Persist a transaction and return it with its assigned id
    fn insert_transaction(&self, tx: &Transaction) -> Result<Transaction>;
    /// Remove every transaction, returning how many were removed
    fn clear_transactions(&self) -> Result<usize>;

    fn list_goals(&self) -> Result<Vec<Goal>>;
    fn get_goal(&self, id: &str) -> Result<Option<Goal>>;
    fn insert_goal(&self, goal: &Goal) -> Result<()>;
    /// Set a goal's saved amount; `false` if the goal does not exist
    fn update_goal_saved(&self, id: &str, saved_amount: f64) -> Result<bool>;
    /// `false` if the goal does not exist
    fn delete_goal(&self, id: &str) -> Result<bool>;
    fn clear_goals(&self) -> Result<usize>;

    /// The challenge set persisted for a calendar day, if any
    fn load_challenges(&self, date: NaiveDate) -> Result<Option<Vec<ChallengeInstance>>>;
    fn save_challenges(&self, date: NaiveDate, challenges: &[ChallengeInstance]) -> Result<()>;
    fn remove_challenges(&self, date: NaiveDate) -> Result<()>;

    /// A score series, ascending by time key
    fn load_series(&self, granularity: Granularity) -> Result<Vec<ScoreSnapshot>>;
    /// Replace a score series wholesale
    fn save_series(&self, granularity: Granularity, snapshots: &[ScoreSnapshot]) -> Result<()>;

    /// Replace both series together; stores with transactions write them atomically
    fn save_history(&self, hourly: &[ScoreSnapshot], minute: &[ScoreSnapshot]) -> Result<()> {
        self.save_series(Granularity::Hour, hourly)?;
        self.save_series(Granularity::Minute, minute)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    next_transaction_id: i64,
    transactions: Vec<Transaction>,
    goals: Vec<Goal>,
    challenges: HashMap<NaiveDate, Vec<ChallengeInstance>>,
    series: HashMap<Granularity, BTreeMap<String, u8>>,
}

/// A [`Store`] that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| Error::InvalidData("Memory store lock poisoned".to_string()))
    }
}

impl Store for MemoryStore {
    fn list_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.state()?.transactions.clone())
    }

    fn insert_transaction(&self, tx: &Transaction) -> Result<Transaction> {
        let mut state = self.state()?;
        state.next_transaction_id += 1;
        let mut stored = tx.clone();
        stored.id = state.next_transaction_id;
        state.transactions.push(stored.clone());
        Ok(stored)
    }

    fn clear_transactions(&self) -> Result<usize> {
        let mut state = self.state()?;
        let removed = state.transactions.len();
        state.transactions.clear();
        Ok(removed)
    }

    fn list_goals(&self) -> Result<Vec<Goal>> {
        Ok(self.state()?.goals.clone())
    }

    fn get_goal(&self, id: &str) -> Result<Option<Goal>> {
        Ok(self.state()?.goals.iter().find(|g| g.id == id).cloned())
    }

    fn insert_goal(&self, goal: &Goal) -> Result<()> {
        let mut state = self.state()?;
        state.goals.retain(|g| g.id != goal.id);
        state.goals.push(goal.clone());
        Ok(())
    }

    fn update_goal_saved(&self, id: &str, saved_amount: f64) -> Result<bool> {
        let mut state = self.state()?;
        match state.goals.iter_mut().find(|g| g.id == id) {
            Some(goal) => {
                goal.saved_amount = saved_amount;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_goal(&self, id: &str) -> Result<bool> {
        let mut state = self.state()?;
        let before = state.goals.len();
        state.goals.retain(|g| g.id != id);
        Ok(state.goals.len() != before)
    }

    fn clear_goals(&self) -> Result<usize> {
        let mut state = self.state()?;
        let removed = state.goals.len();
        state.goals.clear();
        Ok(removed)
    }

    fn load_challenges(&self, date: NaiveDate) -> Result<Option<Vec<ChallengeInstance>>> {
        Ok(self.state()?.challenges.get(&date).cloned())
    }

    fn save_challenges(&self, date: NaiveDate, challenges: &[ChallengeInstance]) -> Result<()> {
        self.state()?.challenges.insert(date, challenges.to_vec());
        Ok(())
    }

    fn remove_challenges(&self, date: NaiveDate) -> Result<()> {
        self.state()?.challenges.remove(&date);
        Ok(())
    }

    fn load_series(&self, granularity: Granularity) -> Result<Vec<ScoreSnapshot>> {
        let state = self.state()?;
        Ok(state
            .series
            .get(&granularity)
            .map(|series| {
                series
                    .iter()
                    .map(|(time_key, score)| ScoreSnapshot {
                        time_key: time_key.clone(),
                        score: *score,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn save_series(&self, granularity: Granularity, snapshots: &[ScoreSnapshot]) -> Result<()> {
        self.state()?.series.insert(granularity, to_series(snapshots));
        Ok(())
    }

    fn save_history(&self, hourly: &[ScoreSnapshot], minute: &[ScoreSnapshot]) -> Result<()> {
        let mut state = self.state()?;
        state.series.insert(Granularity::Hour, to_series(hourly));
        state.series.insert(Granularity::Minute, to_series(minute));
        Ok(())
    }
}

fn to_series(snapshots: &[ScoreSnapshot]) -> BTreeMap<String, u8> {
    snapshots
        .iter()
        .map(|s| (s.time_key.clone(), s.score))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;
    use chrono::Utc;

    fn sample_tx(amount: f64) -> Transaction {
        Transaction {
            id: 0,
            transaction_type: TransactionType::Income,
            amount,
            category: "allowance".to_string(),
            date: Utc::now().date_naive(),
            note: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_memory_store_assigns_ids() {
        let store = MemoryStore::new();
        let a = store.insert_transaction(&sample_tx(5.0)).unwrap();
        let b = store.insert_transaction(&sample_tx(7.0)).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.list_transactions().unwrap().len(), 2);
        assert_eq!(store.clear_transactions().unwrap(), 2);
        assert!(store.list_transactions().unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_series_sorted() {
        let store = MemoryStore::new();
        let snapshots = vec![
            ScoreSnapshot { time_key: "2024-01-01T10:05".to_string(), score: 20 },
            ScoreSnapshot { time_key: "2024-01-01T09:00".to_string(), score: 10 },
        ];
        store.save_series(Granularity::Minute, &snapshots).unwrap();
        let loaded = store.load_series(Granularity::Minute).unwrap();
        assert_eq!(loaded[0].time_key, "2024-01-01T09:00");
        assert!(store.load_series(Granularity::Hour).unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_saves_both_series() {
        let store = MemoryStore::new();
        let hourly = vec![ScoreSnapshot { time_key: "2024-01-01T09".to_string(), score: 40 }];
        let minute = vec![
            ScoreSnapshot { time_key: "2024-01-01T09:00".to_string(), score: 30 },
            ScoreSnapshot { time_key: "2024-01-01T09:05".to_string(), score: 40 },
        ];
        store.save_history(&hourly, &minute).unwrap();
        assert_eq!(store.load_series(Granularity::Hour).unwrap(), hourly);
        assert_eq!(store.load_series(Granularity::Minute).unwrap(), minute);
    }
}
