//! Score history
//!
//! Two bounded series keyed by UTC time key: an hourly one (`YYYY-MM-DDTHH`)
//! and a minute one (`YYYY-MM-DDTHH:MM`). Keys sort lexicographically in
//! time order, so eviction drops the smallest keys.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::HistoryConfig;
use crate::error::Result;
use crate::models::{Granularity, ScoreSnapshot};
use crate::store::Store;

/// Offset of the synthetic bootstrap snapshot
pub const BOOTSTRAP_OFFSET_MINUTES: i64 = 5;

/// Score drop applied to the synthetic bootstrap snapshot
pub const BOOTSTRAP_SCORE_DROP: u8 = 10;

/// Both score series
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreHistory {
    pub hourly: BTreeMap<String, u8>,
    pub minute: BTreeMap<String, u8>,
}

impl ScoreHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<S: Store + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self {
            hourly: to_map(store.load_series(Granularity::Hour)?),
            minute: to_map(store.load_series(Granularity::Minute)?),
        })
    }

    pub fn save<S: Store + ?Sized>(&self, store: &S) -> Result<()> {
        store.save_history(&to_snapshots(&self.hourly), &to_snapshots(&self.minute))
    }

    pub fn series(&self, granularity: Granularity) -> &BTreeMap<String, u8> {
        match granularity {
            Granularity::Hour => &self.hourly,
            Granularity::Minute => &self.minute,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hourly.is_empty() && self.minute.is_empty()
    }

    /// Record the score at `now` in both series
    ///
    /// The minute entry is always written. The hour entry is written only
    /// when the key is new or the score differs. When the minute series has
    /// exactly one entry afterwards (and bootstrapping is enabled), a second
    /// entry five minutes earlier with a score ten points lower is added so
    /// the first change can be shown.
    pub fn record_snapshot(&mut self, score: u8, now: DateTime<Utc>, config: &HistoryConfig) {
        let minute_key = Granularity::Minute.key_for(now);
        self.minute.insert(minute_key.clone(), score);
        evict_oldest(&mut self.minute, config.minute_capacity);

        let hour_key = Granularity::Hour.key_for(now);
        if self.hourly.get(&hour_key) != Some(&score) {
            self.hourly.insert(hour_key.clone(), score);
            evict_oldest(&mut self.hourly, config.hourly_capacity);
            tracing::debug!(key = %hour_key, score, "Hourly score recorded");
        }

        if config.bootstrap_synthetic_entry && self.minute.len() == 1 {
            let earlier = now - Duration::minutes(BOOTSTRAP_OFFSET_MINUTES);
            let earlier_key = Granularity::Minute.key_for(earlier);
            let earlier_score = score.saturating_sub(BOOTSTRAP_SCORE_DROP);
            self.minute.insert(earlier_key.clone(), earlier_score);
            evict_oldest(&mut self.minute, config.minute_capacity);
            tracing::debug!(key = %earlier_key, score = earlier_score, "Seeded bootstrap snapshot");
        }

        tracing::debug!(
            key = %minute_key,
            score,
            minute_entries = self.minute.len(),
            hourly_entries = self.hourly.len(),
            "Score snapshot recorded"
        );
    }
}

/// Load, record and persist in one step
pub fn record_snapshot<S: Store + ?Sized>(
    store: &S,
    score: u8,
    now: DateTime<Utc>,
    config: &HistoryConfig,
) -> Result<ScoreHistory> {
    let mut history = ScoreHistory::load(store)?;
    history.record_snapshot(score, now, config);
    history.save(store)?;
    Ok(history)
}

fn evict_oldest(series: &mut BTreeMap<String, u8>, capacity: usize) {
    while series.len() > capacity {
        if series.pop_first().is_none() {
            break;
        }
    }
}

fn to_map(snapshots: Vec<ScoreSnapshot>) -> BTreeMap<String, u8> {
    snapshots.into_iter().map(|s| (s.time_key, s.score)).collect()
}

fn to_snapshots(series: &BTreeMap<String, u8>) -> Vec<ScoreSnapshot> {
    series
        .iter()
        .map(|(time_key, score)| ScoreSnapshot {
            time_key: time_key.clone(),
            score: *score,
        })
        .collect()
}
