//! Domain models for SmartCents

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded income or expense
///
/// Immutable once stored; only removed by a bulk reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-assigned identity (0 for records that never hit a store)
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Always positive; the direction comes from `transaction_type`
    pub amount: f64,
    pub category: String,
    /// Calendar date the user entered
    pub date: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
    /// When the record was created
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }
}

/// A transaction submitted by the user (before the store assigns identity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub category: String,
    /// Defaults to today when absent
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub note: Option<String>,
}

impl NewTransaction {
    pub fn income(amount: f64, category: &str) -> Self {
        Self {
            transaction_type: TransactionType::Income,
            amount,
            category: category.to_string(),
            date: None,
            note: None,
        }
    }

    pub fn expense(amount: f64, category: &str) -> Self {
        Self {
            transaction_type: TransactionType::Expense,
            amount,
            category: category.to_string(),
            date: None,
            note: None,
        }
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Reject non-positive amounts and blank categories
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "Transaction amount must be positive, got {}",
                self.amount
            )));
        }
        if self.category.trim().is_empty() {
            return Err(Error::InvalidData(
                "Transaction category is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// A savings goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    /// May exceed the target; never decreases
    #[serde(default)]
    pub saved_amount: f64,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Goal {
    /// A goal is completed once the saved amount reaches the target
    pub fn is_completed(&self) -> bool {
        self.saved_amount >= self.target_amount
    }

    pub fn is_active(&self) -> bool {
        !self.is_completed()
    }

    /// Amount still needed (never negative)
    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.saved_amount).max(0.0)
    }

    /// Progress toward the target, capped at 100
    pub fn progress_percent(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 100.0;
        }
        (self.saved_amount / self.target_amount * 100.0).min(100.0)
    }
}

/// A goal submitted by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub note: Option<String>,
}

impl NewGoal {
    pub fn new(name: &str, target_amount: f64) -> Self {
        Self {
            name: name.to_string(),
            target_amount,
            target_date: None,
            note: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidData("Goal name is required".to_string()));
        }
        if !self.target_amount.is_finite() || self.target_amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "Goal target must be positive, got {}",
                self.target_amount
            )));
        }
        Ok(())
    }
}

/// Challenge difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a single "complete" action advances a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "step", rename_all = "snake_case")]
pub enum IncrementStrategy {
    /// Add a fixed step, capped at the target
    FixedIncrement(u32),
    /// Jump straight to the target
    BinaryComplete,
}

/// One of today's three challenges, with its mutable progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeInstance {
    pub id: String,
    pub name: String,
    pub description: String,
    pub target: u32,
    pub difficulty: Difficulty,
    pub points: u32,
    /// Rotation cadence (the catalog only has daily challenges)
    #[serde(rename = "type")]
    pub kind: String,
    /// Button label shown to the user
    pub action: String,
    pub increment: IncrementStrategy,
    pub progress: u32,
    pub completed: bool,
    /// Calendar day this instance belongs to
    pub date: NaiveDate,
}

/// Granularity of a score history series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    Minute,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Minute => "minute",
        }
    }

    /// chrono format string for this granularity's time key
    pub fn key_format(&self) -> &'static str {
        match self {
            Self::Hour => "%Y-%m-%dT%H",
            Self::Minute => "%Y-%m-%dT%H:%M",
        }
    }

    /// Time key for an instant (`YYYY-MM-DDTHH` or `YYYY-MM-DDTHH:MM`, UTC)
    pub fn key_for(&self, at: DateTime<Utc>) -> String {
        at.format(self.key_format()).to_string()
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "hour" => Ok(Self::Hour),
            "minute" => Ok(Self::Minute),
            _ => Err(format!("Unknown granularity: {}", s)),
        }
    }
}

/// A single point in a score history series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub time_key: String,
    pub score: u8,
}

/// A derived score change with its inferred reason (never persisted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    /// Time key of the later snapshot
    pub timestamp: String,
    pub score: u8,
    pub previous_score: u8,
    pub delta: i32,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_transaction_type_roundtrip() {
        assert_eq!("income".parse::<TransactionType>(), Ok(TransactionType::Income));
        assert_eq!("EXPENSE".parse::<TransactionType>(), Ok(TransactionType::Expense));
        assert!("refund".parse::<TransactionType>().is_err());
        assert_eq!(TransactionType::Expense.to_string(), "expense");
    }

    #[test]
    fn test_new_transaction_validation() {
        assert!(NewTransaction::income(10.0, "allowance").validate().is_ok());
        assert!(NewTransaction::income(0.0, "allowance").validate().is_err());
        assert!(NewTransaction::expense(-3.0, "food").validate().is_err());
        assert!(NewTransaction::expense(f64::NAN, "food").validate().is_err());
        assert!(NewTransaction::expense(3.0, "   ").validate().is_err());
    }

    #[test]
    fn test_goal_completion() {
        let mut goal = Goal {
            id: "g1".to_string(),
            name: "Bike".to_string(),
            target_amount: 100.0,
            saved_amount: 40.0,
            target_date: None,
            note: None,
            timestamp: Utc::now(),
        };
        assert!(goal.is_active());
        assert_eq!(goal.remaining(), 60.0);
        assert_eq!(goal.progress_percent(), 40.0);

        goal.saved_amount = 120.0;
        assert!(goal.is_completed());
        assert_eq!(goal.remaining(), 0.0);
        assert_eq!(goal.progress_percent(), 100.0);
    }

    #[test]
    fn test_goal_json_uses_camel_case() {
        let json = r#"{"id":"1","name":"Phone","targetAmount":300,"timestamp":"2024-05-01T10:00:00Z"}"#;
        let goal: Goal = serde_json::from_str(json).unwrap();
        assert_eq!(goal.target_amount, 300.0);
        assert_eq!(goal.saved_amount, 0.0);
        assert!(goal.target_date.is_none());
    }

    #[test]
    fn test_transaction_json_shape() {
        let json = r#"{"type":"expense","amount":12.5,"category":"food","date":"2024-05-01","timestamp":"2024-05-01T10:00:00Z"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert!(tx.is_expense());
        assert_eq!(tx.id, 0);
        assert!(tx.note.is_none());
    }

    #[test]
    fn test_granularity_keys() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 42).unwrap();
        assert_eq!(Granularity::Hour.key_for(at), "2024-03-09T07");
        assert_eq!(Granularity::Minute.key_for(at), "2024-03-09T07:05");
    }

    #[test]
    fn test_increment_strategy_json() {
        let fixed = serde_json::to_value(IncrementStrategy::FixedIncrement(2)).unwrap();
        assert_eq!(fixed, serde_json::json!({"kind": "fixed_increment", "step": 2}));
        let binary = serde_json::to_value(IncrementStrategy::BinaryComplete).unwrap();
        assert_eq!(binary, serde_json::json!({"kind": "binary_complete"}));
    }
}
