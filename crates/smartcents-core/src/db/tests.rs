//! Database tests

use super::*;
use crate::challenges::{complete_challenge, todays_challenges, CompletionOutcome, CATALOG};
use crate::config::HistoryConfig;
use crate::history::{record_snapshot, ScoreHistory};
use crate::models::*;
use crate::store::Store;
use chrono::TimeZone;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn sample_transaction(kind: TransactionType, amount: f64, category: &str) -> Transaction {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Transaction {
        id: 0,
        transaction_type: kind,
        amount,
        category: category.to_string(),
        date: at.date_naive(),
        note: None,
        timestamp: at,
    }
}

fn sample_goal(id: &str, target: f64) -> Goal {
    Goal {
        id: id.to_string(),
        name: "New bike".to_string(),
        target_amount: target,
        saved_amount: 0.0,
        target_date: NaiveDate::from_ymd_opt(2024, 12, 1),
        note: Some("red one".to_string()),
        timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
    }
}

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    assert!(db.list_transactions().unwrap().is_empty());
    assert!(db.list_goals().unwrap().is_empty());
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[test]
fn test_schema_exists() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
             AND name IN ('transactions', 'goals', 'daily_challenges', 'score_snapshots')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 4);
}

#[test]
fn test_transaction_roundtrip() {
    let db = Database::in_memory().unwrap();

    let mut income = sample_transaction(TransactionType::Income, 50.0, "allowance");
    income.note = Some("weekly".to_string());
    let id = db.insert_transaction(&income).unwrap();
    assert!(id > 0);

    let stored = db.get_transaction(id).unwrap().unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.transaction_type, TransactionType::Income);
    assert_eq!(stored.amount, 50.0);
    assert_eq!(stored.note.as_deref(), Some("weekly"));
    assert_eq!(stored.date, income.date);
    assert_eq!(stored.timestamp, income.timestamp);

    assert!(db.get_transaction(id + 100).unwrap().is_none());
}

#[test]
fn test_transactions_keep_insertion_order_and_clear() {
    let db = Database::in_memory().unwrap();
    db.insert_transaction(&sample_transaction(TransactionType::Income, 100.0, "job"))
        .unwrap();
    db.insert_transaction(&sample_transaction(TransactionType::Expense, 20.0, "food"))
        .unwrap();

    let all = db.list_transactions().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].category, "job");
    assert_eq!(all[1].category, "food");

    assert_eq!(db.clear_transactions().unwrap(), 2);
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[test]
fn test_store_insert_assigns_id() {
    let db = Database::in_memory().unwrap();
    let store: &dyn Store = &db;
    let stored = store
        .insert_transaction(&sample_transaction(TransactionType::Expense, 9.5, "games"))
        .unwrap();
    assert!(stored.id > 0);
    assert_eq!(store.list_transactions().unwrap(), vec![stored]);
}

#[test]
fn test_goal_crud() {
    let db = Database::in_memory().unwrap();
    let goal = sample_goal("g1", 200.0);
    db.insert_goal(&goal).unwrap();

    assert_eq!(db.get_goal("g1").unwrap(), Some(goal.clone()));
    assert!(db.update_goal_saved("g1", 75.0).unwrap());
    assert_eq!(db.get_goal("g1").unwrap().unwrap().saved_amount, 75.0);
    assert!(!db.update_goal_saved("missing", 1.0).unwrap());

    assert!(db.delete_goal("g1").unwrap());
    assert!(!db.delete_goal("g1").unwrap());
    assert!(db.list_goals().unwrap().is_empty());
}

#[test]
fn test_clear_goals() {
    let db = Database::in_memory().unwrap();
    db.insert_goal(&sample_goal("a", 10.0)).unwrap();
    db.insert_goal(&sample_goal("b", 20.0)).unwrap();
    assert_eq!(db.list_goals().unwrap().len(), 2);
    assert_eq!(db.clear_goals().unwrap(), 2);
    assert!(db.list_goals().unwrap().is_empty());
}

#[test]
fn test_challenge_set_roundtrip() {
    let db = Database::in_memory().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    assert!(db.load_challenges(date).unwrap().is_none());

    let mut set: Vec<ChallengeInstance> = CATALOG[..3].iter().map(|t| t.instantiate(date)).collect();
    set[0].progress = 1;
    db.save_challenges(date, &set).unwrap();
    assert_eq!(db.load_challenges(date).unwrap(), Some(set.clone()));

    set[1].completed = true;
    db.save_challenges(date, &set).unwrap();
    assert_eq!(db.load_challenges(date).unwrap(), Some(set));

    db.remove_challenges(date).unwrap();
    assert!(db.load_challenges(date).unwrap().is_none());
}

#[test]
fn test_daily_challenges_persist_across_handles() {
    let db = Database::in_memory().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let drawn = todays_challenges(&db, date, &mut rng).unwrap();
    assert_eq!(drawn.len(), 3);

    let reopened = Database::new_unencrypted(db.path()).unwrap();
    let mut other_rng = StdRng::seed_from_u64(99);
    assert_eq!(todays_challenges(&reopened, date, &mut other_rng).unwrap(), drawn);

    let outcome = complete_challenge(&reopened, date, &drawn[0].id).unwrap();
    assert_ne!(outcome, CompletionOutcome::NotFound);
    let after = db.load_challenges(date).unwrap().unwrap();
    assert!(after[0].progress > 0);
}

#[test]
fn test_series_replace_and_order() {
    let db = Database::in_memory().unwrap();
    let snapshots = vec![
        ScoreSnapshot {
            time_key: "2024-06-01T10:05".to_string(),
            score: 40,
        },
        ScoreSnapshot {
            time_key: "2024-06-01T09:59".to_string(),
            score: 30,
        },
    ];
    db.save_series(Granularity::Minute, &snapshots).unwrap();

    let loaded = db.load_series(Granularity::Minute).unwrap();
    assert_eq!(loaded[0].time_key, "2024-06-01T09:59");
    assert_eq!(loaded[1].time_key, "2024-06-01T10:05");
    assert!(db.load_series(Granularity::Hour).unwrap().is_empty());

    db.save_series(Granularity::Minute, &snapshots[..1]).unwrap();
    assert_eq!(db.load_series(Granularity::Minute).unwrap().len(), 1);
}

#[test]
fn test_save_history_replaces_both_series() {
    let db = Database::in_memory().unwrap();
    let snapshot = |key: &str, score: u8| ScoreSnapshot {
        time_key: key.to_string(),
        score,
    };
    db.save_history(
        &[snapshot("2024-06-01T09", 20)],
        &[snapshot("2024-06-01T09:10", 20), snapshot("2024-06-01T09:20", 25)],
    )
    .unwrap();

    db.save_history(
        &[snapshot("2024-06-01T10", 30)],
        &[snapshot("2024-06-01T10:00", 30)],
    )
    .unwrap();

    assert_eq!(
        db.load_series(Granularity::Hour).unwrap(),
        vec![snapshot("2024-06-01T10", 30)]
    );
    assert_eq!(
        db.load_series(Granularity::Minute).unwrap(),
        vec![snapshot("2024-06-01T10:00", 30)]
    );
}

#[test]
fn test_history_through_database() {
    let db = Database::in_memory().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
    record_snapshot(&db, 45, now, &HistoryConfig::default()).unwrap();

    let history = ScoreHistory::load(&db).unwrap();
    assert_eq!(history.minute.len(), 2);
    assert_eq!(history.minute.get("2024-06-01T09:55"), Some(&35));
    assert_eq!(history.hourly.get("2024-06-01T10"), Some(&45));
}

#[test]
fn test_encrypted_database_requires_matching_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("secret.db");
    let path = path.to_str().unwrap();

    let db = Database::new_with_key(path, Some("correct horse")).unwrap();
    db.insert_goal(&sample_goal("g1", 50.0)).unwrap();
    drop(db);

    let reopened = Database::new_with_key(path, Some("correct horse")).unwrap();
    assert_eq!(reopened.list_goals().unwrap().len(), 1);

    assert!(Database::new_with_key(path, Some("wrong key")).is_err());
}

#[test]
fn test_derive_key_is_deterministic() {
    let a = derive_key("passphrase").unwrap();
    let b = derive_key("passphrase").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
    assert_ne!(a, derive_key("other").unwrap());
}
