//! Financial independence score
//!
//! A pure function of the user's transactions, goals, today's challenges and
//! the current instant. Every contribution is a whole number of points; the
//! sum is clamped to `0..=100` at the end.
//!
//! | Component            | Points                                        |
//! |----------------------|-----------------------------------------------|
//! | Savings rate         | ≥20% +30, ≥10% +20, ≥5% +10, <0% −10           |
//! | Expense categories   | ≥4 +30, 3 +20, 2 +10, 1 +5, 0 −5               |
//! | Goals                | min(5×completed, 10) + min(3×active, 10)       |
//! | Recent savings (30d) | net > 0 +15, net < 0 −5                        |
//! | Transaction volume   | ≥10 +10, ≥5 +5, <3 −5                          |
//! | Daily challenges     | completed points, capped at 25                 |
//! | Inactivity           | >7d −5, >14d another −10, >30d another −20     |

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{ChallengeInstance, Goal, Transaction};

pub const MAX_SCORE: i32 = 100;

/// Trailing window for the recent-savings component
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Cap on bonus points from daily challenges
pub const CHALLENGE_POINTS_CAP: u32 = 25;

/// Inactivity penalty tiers; each one that applies is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InactivityPenalty {
    /// More than a week without a transaction
    Week,
    /// More than two weeks
    TwoWeeks,
    /// More than a month
    Month,
}

impl InactivityPenalty {
    pub fn all() -> &'static [InactivityPenalty] {
        &[Self::Week, Self::TwoWeeks, Self::Month]
    }

    /// Days of inactivity that must be exceeded for this tier
    pub fn threshold_days(&self) -> f64 {
        match self {
            Self::Week => 7.0,
            Self::TwoWeeks => 14.0,
            Self::Month => 30.0,
        }
    }

    pub fn points(&self) -> i32 {
        match self {
            Self::Week => -5,
            Self::TwoWeeks => -10,
            Self::Month => -20,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Week => "Inactivity penalty: -5 points",
            Self::TwoWeeks => "Extended inactivity: -10 points",
            Self::Month => "Long-term inactivity: -20 points",
        }
    }

    /// Every tier charged for the given number of idle days
    pub fn for_days(days: f64) -> Vec<InactivityPenalty> {
        Self::all()
            .iter()
            .copied()
            .filter(|p| days > p.threshold_days())
            .collect()
    }
}

/// Fractional days since the most recent transaction, `None` with no transactions
pub fn days_since_last_activity(transactions: &[Transaction], now: DateTime<Utc>) -> Option<f64> {
    let latest = transactions.iter().map(|t| t.timestamp).max()?;
    let elapsed = now - latest;
    Some(elapsed.num_milliseconds() as f64 / Duration::days(1).num_milliseconds() as f64)
}

/// Sum of income and sum of expenses
pub fn totals(transactions: &[Transaction]) -> (f64, f64) {
    transactions.iter().fold((0.0, 0.0), |(income, expenses), t| {
        if t.is_income() {
            (income + t.amount, expenses)
        } else {
            (income, expenses + t.amount)
        }
    })
}

/// Itemized score, one field per component
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// `(income - expenses) / income * 100`, absent without income
    pub savings_rate: Option<f64>,
    pub savings_rate_points: i32,
    pub category_count: usize,
    pub category_points: i32,
    pub goal_points: i32,
    pub recent_savings_points: i32,
    pub volume_points: i32,
    pub challenge_points: i32,
    pub inactivity: Vec<InactivityPenalty>,
    pub inactivity_points: i32,
    /// Sum before clamping
    pub raw_total: i32,
    pub score: u8,
}

/// Compute the independence score (0–100)
pub fn compute_score(
    transactions: &[Transaction],
    goals: &[Goal],
    challenges: &[ChallengeInstance],
    now: DateTime<Utc>,
) -> u8 {
    score_breakdown(transactions, goals, challenges, now).score
}

/// Compute the score along with each component's contribution
pub fn score_breakdown(
    transactions: &[Transaction],
    goals: &[Goal],
    challenges: &[ChallengeInstance],
    now: DateTime<Utc>,
) -> ScoreBreakdown {
    if transactions.is_empty() {
        return ScoreBreakdown::default();
    }

    let (income, expenses) = totals(transactions);
    if income <= 0.0 {
        return ScoreBreakdown::default();
    }

    let savings = income - expenses;
    let savings_rate = savings / income * 100.0;
    let savings_rate_points = savings_rate_points(savings_rate);

    let category_count = transactions
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.category.as_str())
        .collect::<HashSet<_>>()
        .len();
    let category_points = category_points(category_count);

    let goal_points = goal_points(goals);

    // Only rewarded while overall savings are positive
    let recent_savings_points = if savings > 0.0 {
        recent_savings_points(transactions, now)
    } else {
        0
    };

    let volume_points = volume_points(transactions.len());

    let earned = challenges
        .iter()
        .filter(|c| c.completed)
        .fold(0u32, |acc, c| acc.saturating_add(c.points));
    let challenge_points = earned.min(CHALLENGE_POINTS_CAP) as i32;

    let inactivity = days_since_last_activity(transactions, now)
        .map(InactivityPenalty::for_days)
        .unwrap_or_default();
    let inactivity_points: i32 = inactivity.iter().map(|p| p.points()).sum();

    let raw_total = savings_rate_points
        + category_points
        + goal_points
        + recent_savings_points
        + volume_points
        + challenge_points
        + inactivity_points;
    let score = raw_total.clamp(0, MAX_SCORE) as u8;

    tracing::debug!(
        savings_rate,
        savings_rate_points,
        category_points,
        goal_points,
        recent_savings_points,
        volume_points,
        challenge_points,
        inactivity_points,
        raw_total,
        score,
        "Score computed"
    );

    ScoreBreakdown {
        savings_rate: Some(savings_rate),
        savings_rate_points,
        category_count,
        category_points,
        goal_points,
        recent_savings_points,
        volume_points,
        challenge_points,
        inactivity,
        inactivity_points,
        raw_total,
        score,
    }
}

fn savings_rate_points(rate: f64) -> i32 {
    if rate >= 20.0 {
        30
    } else if rate >= 10.0 {
        20
    } else if rate >= 5.0 {
        10
    } else if rate < 0.0 {
        -10
    } else {
        0
    }
}

fn category_points(count: usize) -> i32 {
    match count {
        0 => -5,
        1 => 5,
        2 => 10,
        3 => 20,
        _ => 30,
    }
}

fn goal_points(goals: &[Goal]) -> i32 {
    let completed = goals.iter().filter(|g| g.is_completed()).count() as i32;
    let active = goals.len() as i32 - completed;
    (completed * 5).min(10) + (active * 3).min(10)
}

fn recent_savings_points(transactions: &[Transaction], now: DateTime<Utc>) -> i32 {
    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let recent: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.timestamp >= cutoff)
        .cloned()
        .collect();
    if recent.is_empty() {
        return 0;
    }

    let (income, expenses) = totals(&recent);
    let net = income - expenses;
    if net > 0.0 {
        15
    } else if net < 0.0 {
        -5
    } else {
        0
    }
}

fn volume_points(count: usize) -> i32 {
    if count >= 10 {
        10
    } else if count >= 5 {
        5
    } else if count < 3 {
        -5
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, IncrementStrategy, TransactionType};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn tx(kind: TransactionType, amount: f64, category: &str, days_ago: i64) -> Transaction {
        let timestamp = now() - Duration::days(days_ago);
        Transaction {
            id: 0,
            transaction_type: kind,
            amount,
            category: category.to_string(),
            date: timestamp.date_naive(),
            note: None,
            timestamp,
        }
    }

    fn income(amount: f64, days_ago: i64) -> Transaction {
        tx(TransactionType::Income, amount, "allowance", days_ago)
    }

    fn expense(amount: f64, category: &str, days_ago: i64) -> Transaction {
        tx(TransactionType::Expense, amount, category, days_ago)
    }

    fn goal(target: f64, saved: f64) -> Goal {
        Goal {
            id: format!("{}-{}", target, saved),
            name: "Goal".to_string(),
            target_amount: target,
            saved_amount: saved,
            target_date: None,
            note: None,
            timestamp: now(),
        }
    }

    fn challenge(points: u32, completed: bool) -> ChallengeInstance {
        ChallengeInstance {
            id: format!("c{}", points),
            name: "Challenge".to_string(),
            description: String::new(),
            target: 1,
            difficulty: Difficulty::Hard,
            points,
            kind: "daily".to_string(),
            action: "Mark Completed".to_string(),
            increment: IncrementStrategy::BinaryComplete,
            progress: if completed { 1 } else { 0 },
            completed,
            date: now().date_naive(),
        }
    }

    #[test]
    fn test_empty_transactions_score_zero() {
        assert_eq!(compute_score(&[], &[goal(10.0, 50.0)], &[challenge(8, true)], now()), 0);
    }

    #[test]
    fn test_zero_income_scores_zero() {
        let txs = vec![
            expense(10.0, "food", 0),
            expense(20.0, "fun", 0),
            expense(5.0, "transport", 0),
            expense(1.0, "gifts", 0),
        ];
        let goals = vec![goal(10.0, 10.0), goal(50.0, 0.0)];
        assert_eq!(compute_score(&txs, &goals, &[challenge(8, true)], now()), 0);
    }

    #[test]
    fn test_scenario_components() {
        // income 100, one food expense of 70: 30% savings rate
        let txs = vec![income(100.0, 20), expense(70.0, "food", 20)];
        let breakdown = score_breakdown(&txs, &[], &[], now());

        assert_eq!(breakdown.savings_rate_points, 30);
        assert_eq!(breakdown.category_points, 5);
        assert_eq!(breakdown.goal_points, 0);
        assert_eq!(breakdown.volume_points, -5);
        assert_eq!(
            breakdown.savings_rate_points
                + breakdown.category_points
                + breakdown.goal_points
                + breakdown.volume_points,
            30
        );

        // 20 days idle: recent savings +15, decay -5 -10
        assert_eq!(breakdown.recent_savings_points, 15);
        assert_eq!(breakdown.inactivity_points, -15);
        assert_eq!(breakdown.score, 30);
    }

    #[test]
    fn test_scenario_outside_recent_window() {
        let txs = vec![income(100.0, 31), expense(70.0, "food", 31)];
        let breakdown = score_breakdown(&txs, &[], &[], now());
        assert_eq!(breakdown.recent_savings_points, 0);
        assert_eq!(breakdown.inactivity_points, -35);
        assert_eq!(breakdown.raw_total, -5);
        assert_eq!(breakdown.score, 0);
    }

    #[test]
    fn test_active_user_scores_high() {
        let mut txs = vec![income(500.0, 1)];
        for (i, cat) in ["food", "fun", "transport", "school", "gifts"].iter().enumerate() {
            txs.push(expense(20.0, cat, i as i64));
        }
        for i in 0..5 {
            txs.push(income(10.0, i));
        }
        let goals = vec![goal(10.0, 10.0), goal(10.0, 20.0), goal(100.0, 5.0)];
        let challenges = vec![challenge(8, true), challenge(7, true), challenge(6, false)];

        let breakdown = score_breakdown(&txs, &goals, &challenges, now());
        assert_eq!(breakdown.savings_rate_points, 30);
        assert_eq!(breakdown.category_points, 30);
        assert_eq!(breakdown.goal_points, 10 + 3);
        assert_eq!(breakdown.recent_savings_points, 15);
        assert_eq!(breakdown.volume_points, 10);
        assert_eq!(breakdown.challenge_points, 15);
        assert_eq!(breakdown.inactivity_points, 0);
        assert_eq!(breakdown.raw_total, 113);
        assert_eq!(breakdown.score, 100);
    }

    #[test]
    fn test_savings_rate_tiers() {
        let cases = [
            (100.0, 75.0, 30), // 25%
            (100.0, 80.0, 30), // exactly 20%
            (100.0, 85.0, 20),
            (100.0, 92.0, 10),
            (100.0, 97.0, 0),
            (100.0, 130.0, -10),
        ];
        for (inc, exp, expected) in cases {
            let txs = vec![income(inc, 0), expense(exp, "food", 0)];
            let breakdown = score_breakdown(&txs, &[], &[], now());
            assert_eq!(breakdown.savings_rate_points, expected, "income {} expense {}", inc, exp);
        }
    }

    #[test]
    fn test_no_expenses_penalizes_categories() {
        let txs = vec![income(50.0, 0)];
        let breakdown = score_breakdown(&txs, &[], &[], now());
        assert_eq!(breakdown.category_count, 0);
        assert_eq!(breakdown.category_points, -5);
    }

    #[test]
    fn test_goal_points_are_capped() {
        let goals: Vec<Goal> = (0..4)
            .map(|_| goal(10.0, 10.0))
            .chain((0..5).map(|_| goal(10.0, 1.0)))
            .collect();
        assert_eq!(goal_points(&goals), 20);
        assert_eq!(goal_points(&[goal(10.0, 0.0)]), 3);
    }

    #[test]
    fn test_recent_overspending_penalized() {
        // Old income keeps overall savings positive, recent month is negative
        let txs = vec![income(1000.0, 60), expense(50.0, "food", 2)];
        let breakdown = score_breakdown(&txs, &[], &[], now());
        assert_eq!(breakdown.recent_savings_points, -5);
    }

    #[test]
    fn test_challenge_points_capped_at_25() {
        let txs = vec![income(100.0, 0), expense(10.0, "food", 0)];
        let challenges = vec![challenge(8, true), challenge(8, true), challenge(8, true), challenge(8, true)];
        let breakdown = score_breakdown(&txs, &[], &challenges, now());
        assert_eq!(breakdown.challenge_points, 25);
    }

    #[test]
    fn test_challenge_points_do_not_overflow() {
        let txs = vec![income(100.0, 0), expense(10.0, "food", 0)];
        let challenges = vec![challenge(u32::MAX, true), challenge(u32::MAX, true)];
        let breakdown = score_breakdown(&txs, &[], &challenges, now());
        assert_eq!(breakdown.challenge_points, 25);
        assert!(breakdown.score <= 100);
    }

    #[test]
    fn test_inactivity_tiers_are_cumulative() {
        assert!(InactivityPenalty::for_days(7.0).is_empty());
        assert_eq!(InactivityPenalty::for_days(7.5), vec![InactivityPenalty::Week]);
        assert_eq!(
            InactivityPenalty::for_days(15.0),
            vec![InactivityPenalty::Week, InactivityPenalty::TwoWeeks]
        );
        assert_eq!(InactivityPenalty::for_days(400.0).len(), 3);
        let total: i32 = InactivityPenalty::all().iter().map(|p| p.points()).sum();
        assert_eq!(total, -35);
    }

    #[test]
    fn test_score_bounded_for_adversarial_inputs() {
        let huge = vec![income(0.01, 10_000), expense(1e12, "a", 10_000)];
        assert_eq!(compute_score(&huge, &[], &[], now()), 0);

        let future = vec![income(1e12, -400), expense(0.01, "a", -400)];
        let score = compute_score(&future, &[], &[challenge(100, true)], now());
        assert!(score <= 100);
    }
}
