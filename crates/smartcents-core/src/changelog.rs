//! Score change log
//!
//! Never stored. Rebuilt on every read by diffing consecutive snapshots and
//! guessing a reason for each change from nearby transactions and
//! inactivity.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use crate::history::ScoreHistory;
use crate::models::{ChangeLogEntry, Granularity, Transaction};
use crate::score::{days_since_last_activity, InactivityPenalty};

/// Entries returned by [`build_change_log`]
pub const CHANGE_LOG_LIMIT: usize = 5;

/// Window around a snapshot in which transactions count as its cause
pub const REASON_WINDOW_HOURS: i64 = 1;

const REASON_SEPARATOR: &str = " | ";

/// What the change log has to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChangeLog {
    /// No snapshots yet
    NoData,
    /// A single snapshot, so nothing to diff against
    InitialScore { score: u8, at: String },
    /// Changes, most recent first (empty when no snapshot pair differed)
    Entries { entries: Vec<ChangeLogEntry> },
}

impl ChangeLog {
    pub fn entries(&self) -> &[ChangeLogEntry] {
        match self {
            Self::Entries { entries } => entries,
            _ => &[],
        }
    }
}

/// Rebuild the change log
///
/// Uses the minute series when it has anything, the hourly series
/// otherwise. Keeps the [`CHANGE_LOG_LIMIT`] most recent non-zero changes.
pub fn build_change_log(
    history: &ScoreHistory,
    transactions: &[Transaction],
    now: DateTime<Utc>,
) -> ChangeLog {
    let granularity = if history.minute.is_empty() {
        Granularity::Hour
    } else {
        Granularity::Minute
    };
    let series = history.series(granularity);

    match series.len() {
        0 => return ChangeLog::NoData,
        1 => {
            if let Some((key, score)) = series.iter().next() {
                return ChangeLog::InitialScore {
                    score: *score,
                    at: key.clone(),
                };
            }
        }
        _ => {}
    }

    let points: Vec<(&String, u8)> = series.iter().map(|(k, v)| (k, *v)).collect();
    let mut entries: Vec<ChangeLogEntry> = points
        .windows(2)
        .filter_map(|pair| {
            let (previous_key, previous_score) = pair[0];
            let (current_key, current_score) = pair[1];
            let delta = current_score as i32 - previous_score as i32;
            if delta == 0 {
                return None;
            }
            Some(ChangeLogEntry {
                timestamp: current_key.clone(),
                score: current_score,
                previous_score,
                delta,
                reason: explain_change(delta, current_key, previous_key, transactions, now),
            })
        })
        .collect();

    let total = entries.len();
    entries.drain(..total.saturating_sub(CHANGE_LOG_LIMIT));
    entries.reverse();

    tracing::debug!(
        granularity = granularity.as_str(),
        snapshots = series.len(),
        changes = total,
        "Change log rebuilt"
    );
    ChangeLog::Entries { entries }
}

/// Describe why the score moved by `delta` at `current_key`
///
/// Lists income and expense totals for transactions within an hour of the
/// snapshot, then every inactivity tier that currently applies. Falls back
/// to a generic sentence when nothing specific is found.
pub fn explain_change(
    delta: i32,
    current_key: &str,
    previous_key: &str,
    transactions: &[Transaction],
    now: DateTime<Utc>,
) -> String {
    let short = if delta > 0 {
        "Score increased"
    } else {
        "Score decreased"
    };
    if current_key.is_empty() || previous_key.is_empty() {
        return short.to_string();
    }
    let Some(at) = parse_time_key(current_key) else {
        tracing::warn!(key = current_key, "Unparseable history key");
        return short.to_string();
    };

    let mut reasons = Vec::new();

    let window_secs = REASON_WINDOW_HOURS * 3600;
    let (income, expenses) = transactions
        .iter()
        .filter(|t| (t.timestamp - at).num_seconds().abs() <= window_secs)
        .fold((0.0, 0.0), |(income, expenses), t| {
            if t.is_income() {
                (income + t.amount, expenses)
            } else {
                (income, expenses + t.amount)
            }
        });
    if income > 0.0 {
        reasons.push(format!("Income added: ${:.2}", income));
    }
    if expenses > 0.0 {
        reasons.push(format!("Expense added: ${:.2}", expenses));
    }

    // No transactions at all counts as unbounded inactivity
    let idle_days = days_since_last_activity(transactions, now).unwrap_or(f64::INFINITY);
    reasons.extend(
        InactivityPenalty::for_days(idle_days)
            .iter()
            .map(|p| p.description().to_string()),
    );

    if !reasons.is_empty() {
        return reasons.join(REASON_SEPARATOR);
    }

    if delta > 0 {
        "Score increased due to improved financial behavior".to_string()
    } else {
        "Score decreased due to financial activity".to_string()
    }
}

/// Parse an hour or minute time key as a UTC instant
pub fn parse_time_key(key: &str) -> Option<DateTime<Utc>> {
    let parsed = match key.len() {
        13 => NaiveDateTime::parse_from_str(&format!("{}:00", key), "%Y-%m-%dT%H:%M"),
        16 => NaiveDateTime::parse_from_str(key, "%Y-%m-%dT%H:%M"),
        _ => return None,
    };
    parsed.ok().map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;
    use chrono::Duration;
    use std::collections::BTreeMap;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, h, m, 0).unwrap()
    }

    fn tx(kind: TransactionType, amount: f64, timestamp: DateTime<Utc>) -> Transaction {
        Transaction {
            id: 0,
            transaction_type: kind,
            amount,
            category: "misc".to_string(),
            date: timestamp.date_naive(),
            note: None,
            timestamp,
        }
    }

    fn minutes(pairs: &[(&str, u8)]) -> ScoreHistory {
        ScoreHistory {
            hourly: BTreeMap::new(),
            minute: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn test_empty_history_is_no_data() {
        assert_eq!(build_change_log(&ScoreHistory::new(), &[], at(9, 0)), ChangeLog::NoData);
    }

    #[test]
    fn test_single_snapshot_is_initial_score() {
        let history = minutes(&[("2024-06-15T09:00", 40)]);
        assert_eq!(
            build_change_log(&history, &[], at(9, 0)),
            ChangeLog::InitialScore {
                score: 40,
                at: "2024-06-15T09:00".to_string()
            }
        );
    }

    #[test]
    fn test_income_change_explained() {
        let history = minutes(&[("2024-06-15T09:00", 40), ("2024-06-15T09:05", 55)]);
        let txs = vec![tx(TransactionType::Income, 12.0, at(9, 4))];

        let log = build_change_log(&history, &txs, at(9, 6));
        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].delta, 15);
        assert_eq!(entries[0].score, 55);
        assert_eq!(entries[0].previous_score, 40);
        assert_eq!(entries[0].timestamp, "2024-06-15T09:05");
        assert_eq!(entries[0].reason, "Income added: $12.00");
    }

    #[test]
    fn test_generic_reason_without_nearby_activity() {
        let history = minutes(&[("2024-06-15T09:00", 40), ("2024-06-15T09:05", 55)]);
        // Transaction well outside the hour window, but recent enough to avoid decay
        let txs = vec![tx(TransactionType::Income, 12.0, at(2, 0))];
        let log = build_change_log(&history, &txs, at(9, 6));
        assert_eq!(
            log.entries()[0].reason,
            "Score increased due to improved financial behavior"
        );
    }

    #[test]
    fn test_equal_scores_produce_no_entries() {
        let history = minutes(&[
            ("2024-06-15T09:00", 40),
            ("2024-06-15T09:01", 40),
            ("2024-06-15T09:02", 40),
        ]);
        let log = build_change_log(&history, &[], at(9, 3));
        assert_eq!(log, ChangeLog::Entries { entries: vec![] });
    }

    #[test]
    fn test_keeps_last_five_most_recent_first() {
        let pairs: Vec<(String, u8)> = (0..10)
            .map(|i| (format!("2024-06-15T09:{:02}", i), (i * 5) as u8))
            .collect();
        let history = ScoreHistory {
            hourly: BTreeMap::new(),
            minute: pairs.into_iter().collect(),
        };
        let txs = vec![tx(TransactionType::Expense, 3.5, at(9, 0))];
        let log = build_change_log(&history, &txs, at(9, 10));
        let keys: Vec<&str> = log.entries().iter().map(|e| e.timestamp.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "2024-06-15T09:09",
                "2024-06-15T09:08",
                "2024-06-15T09:07",
                "2024-06-15T09:06",
                "2024-06-15T09:05"
            ]
        );
        assert!(log.entries().iter().all(|e| e.delta == 5));
    }

    #[test]
    fn test_falls_back_to_hourly_series() {
        let history = ScoreHistory {
            hourly: [("2024-06-15T08".to_string(), 50), ("2024-06-15T09".to_string(), 45)]
                .into_iter()
                .collect(),
            minute: BTreeMap::new(),
        };
        let txs = vec![tx(TransactionType::Expense, 20.0, at(9, 30))];
        let log = build_change_log(&history, &txs, at(9, 45));
        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].delta, -5);
        assert_eq!(entries[0].reason, "Expense added: $20.00");
    }

    #[test]
    fn test_reasons_combine_transactions_and_inactivity() {
        let old = at(9, 0) - Duration::days(20);
        let txs = vec![
            tx(TransactionType::Income, 10.0, old),
            tx(TransactionType::Expense, 4.25, old),
        ];
        let key = Granularity::Minute.key_for(old);
        let reason = explain_change(-5, &key, "2024-05-26T08:00", &txs, at(9, 0));
        assert_eq!(
            reason,
            "Income added: $10.00 | Expense added: $4.25 | Inactivity penalty: -5 points | Extended inactivity: -10 points"
        );
    }

    #[test]
    fn test_no_transactions_means_full_inactivity() {
        let reason = explain_change(-10, "2024-06-15T09:05", "2024-06-15T09:00", &[], at(9, 6));
        assert_eq!(
            reason,
            "Inactivity penalty: -5 points | Extended inactivity: -10 points | Long-term inactivity: -20 points"
        );
    }

    #[test]
    fn test_bad_keys_degrade_to_short_reason() {
        let txs = vec![tx(TransactionType::Income, 1.0, at(9, 0))];
        assert_eq!(explain_change(3, "", "2024-06-15T09:00", &txs, at(9, 0)), "Score increased");
        assert_eq!(explain_change(-3, "garbage", "2024-06-15T09:00", &txs, at(9, 0)), "Score decreased");
    }

    #[test]
    fn test_parse_time_key() {
        assert_eq!(parse_time_key("2024-06-15T09"), Some(at(9, 0)));
        assert_eq!(parse_time_key("2024-06-15T09:05"), Some(at(9, 5)));
        assert_eq!(parse_time_key("2024-06-15"), None);
        assert_eq!(parse_time_key("2024-13-15T09:05"), None);
    }
}
