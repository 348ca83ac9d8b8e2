//! Financial analysis
//!
//! Summaries, rule-based advice and goal predictions. These feed the mentor
//! tip generators and the CLI/API summary views; the score engine does not
//! use them.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{Goal, Transaction};
use crate::score::totals;

/// Categories shown in the prompt context
pub const TOP_CATEGORY_COUNT: usize = 3;

/// Direction of expenses over the last week compared with the one before
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingTrend {
    Increased,
    Decreased,
    Stable,
}

impl SpendingTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increased => "increased",
            Self::Decreased => "decreased",
            Self::Stable => "stable",
        }
    }
}

impl std::fmt::Display for SpendingTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expense total for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    /// Share of all expenses, 0–100
    pub percent: f64,
}

/// Aggregate view of the user's finances
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub savings: f64,
    /// Percent of income saved, absent without income
    pub savings_rate: Option<f64>,
    /// Percent of income spent, absent without income
    pub spending_rate: Option<f64>,
    /// Largest first
    pub categories: Vec<CategoryTotal>,
    pub active_goals: usize,
    pub completed_goals: usize,
    pub last_week_spending: f64,
    pub previous_week_spending: f64,
    pub trend: SpendingTrend,
    pub transaction_count: usize,
}

impl FinancialSummary {
    pub fn from_records(transactions: &[Transaction], goals: &[Goal], now: DateTime<Utc>) -> Self {
        let (total_income, total_expenses) = totals(transactions);
        let savings = total_income - total_expenses;
        let (savings_rate, spending_rate) = if total_income > 0.0 {
            (
                Some(savings / total_income * 100.0),
                Some(total_expenses / total_income * 100.0),
            )
        } else {
            (None, None)
        };

        let categories = category_totals(transactions, total_expenses);
        let completed_goals = goals.iter().filter(|g| g.is_completed()).count();

        // Weeks are measured on the user-entered date, not the record timestamp
        let today = now.date_naive();
        let week_ago = today - Duration::days(7);
        let two_weeks_ago = today - Duration::days(14);
        let (last_week_spending, previous_week_spending) = transactions
            .iter()
            .filter(|t| t.is_expense())
            .fold((0.0, 0.0), |(last, previous), t| {
                if t.date >= week_ago {
                    (last + t.amount, previous)
                } else if t.date >= two_weeks_ago {
                    (last, previous + t.amount)
                } else {
                    (last, previous)
                }
            });
        let trend = if last_week_spending > previous_week_spending {
            SpendingTrend::Increased
        } else if last_week_spending < previous_week_spending {
            SpendingTrend::Decreased
        } else {
            SpendingTrend::Stable
        };

        Self {
            total_income,
            total_expenses,
            savings,
            savings_rate,
            spending_rate,
            categories,
            active_goals: goals.len() - completed_goals,
            completed_goals,
            last_week_spending,
            previous_week_spending,
            trend,
            transaction_count: transactions.len(),
        }
    }

    pub fn top_categories(&self) -> &[CategoryTotal] {
        let n = self.categories.len().min(TOP_CATEGORY_COUNT);
        &self.categories[..n]
    }

    /// Plain-text block describing the user's finances, sent to language models
    pub fn to_prompt_context(&self) -> String {
        if self.transaction_count == 0 {
            return "No financial data available yet.".to_string();
        }

        let top = self
            .top_categories()
            .iter()
            .map(|c| format!("{}: ${:.2}", c.category, c.amount))
            .collect::<Vec<_>>()
            .join(", ");

        let mut out = String::new();
        let _ = writeln!(out, "Income: ${:.2}", self.total_income);
        let _ = writeln!(out, "Expenses: ${:.2}", self.total_expenses);
        let _ = writeln!(out, "Savings: ${:.2}", self.savings);
        let _ = writeln!(out, "Savings Rate: {}%", format_rate(self.savings_rate));
        let _ = writeln!(out, "Spending Rate: {}%", format_rate(self.spending_rate));
        let _ = writeln!(out, "Top Spending Categories: {}", top);
        let _ = writeln!(out, "Active Goals: {}", self.active_goals);
        let _ = writeln!(out, "Completed Goals: {}", self.completed_goals);
        let _ = writeln!(
            out,
            "Recent Spending Trend: {} (Last week: ${:.2}, Previous week: ${:.2})",
            self.trend, self.last_week_spending, self.previous_week_spending
        );
        let _ = write!(out, "Total Transactions: {}", self.transaction_count);
        out
    }
}

fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.1}", rate),
        None => "0".to_string(),
    }
}

fn category_totals(transactions: &[Transaction], total_expenses: f64) -> Vec<CategoryTotal> {
    let mut by_category: HashMap<&str, f64> = HashMap::new();
    for t in transactions.iter().filter(|t| t.is_expense()) {
        *by_category.entry(t.category.as_str()).or_default() += t.amount;
    }

    let mut categories: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category: category.to_string(),
            amount,
            percent: if total_expenses > 0.0 {
                amount / total_expenses * 100.0
            } else {
                0.0
            },
        })
        .collect();
    // Ties broken by name so output is stable
    categories.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    categories
}

/// Expenses as a fraction of income (0 without income)
fn spending_ratio(transactions: &[Transaction]) -> f64 {
    let (income, expenses) = totals(transactions);
    if income > 0.0 {
        expenses / income
    } else {
        0.0
    }
}

/// Short rule-based tip, keyed on how much of income is spent
pub fn mentor_tip(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "Start tracking your income and expenses to get personalized financial advice."
            .to_string();
    }

    let rate = spending_ratio(transactions);
    if rate <= 0.8 {
        "Great job! You are saving more than 20% of your income. Keep up the excellent financial habits.".to_string()
    } else if rate <= 0.9 {
        "Your spending looks balanced. Consider setting specific savings goals to accelerate your financial independence.".to_string()
    } else {
        "Try to keep your expenses under 80% of your income. Consider setting up automatic transfers to make saving easier!".to_string()
    }
}

/// Rule-based advice that also calls out a dominant spending category
pub fn personalized_advice(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "Start tracking your finances to receive personalized advice tailored to your spending patterns.".to_string();
    }

    let rate = spending_ratio(transactions);
    let (_, total_expenses) = totals(transactions);
    let categories = category_totals(transactions, total_expenses);
    let (top_name, top_share) = categories
        .first()
        .map(|c| (c.category.as_str(), c.percent / 100.0))
        .unwrap_or(("", 0.0));

    if rate <= 0.8 {
        "Great job! You're saving more than 20% of your income.".to_string()
    } else if rate <= 0.9 {
        if top_share > 0.5 {
            format!("Good progress, but {} is eating too much of your budget.", top_name)
        } else {
            "Keep going! Try raising your savings rate to 20%.".to_string()
        }
    } else if top_share > 0.4 {
        format!(
            "Consider reducing {} spending to save more. Try the 50/30/20 rule.",
            top_name
        )
    } else {
        "Your spending is above 90% of income. Aim to keep expenses under 80%.".to_string()
    }
}

/// How long a goal will take at the current savings pace
///
/// Net savings across all transactions is treated as a weekly amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GoalPrediction {
    /// Not saving anything, so no estimate
    NeedsMoreSavings,
    AlreadyReached,
    Weeks(u64),
    /// 52 weeks or more
    Years(f64),
}

impl GoalPrediction {
    pub fn message(&self) -> String {
        match self {
            Self::NeedsMoreSavings => "You need to increase your savings rate to reach this goal. Consider reducing expenses or increasing income.".to_string(),
            Self::AlreadyReached => "Congratulations! You have already reached this goal.".to_string(),
            Self::Weeks(1) => "At your current pace, you will reach this goal in 1 week.".to_string(),
            Self::Weeks(weeks) => format!("At your current pace, you will reach this goal in {} weeks.", weeks),
            Self::Years(years) => format!(
                "At your current pace, you will reach this goal in {:.1} years. Consider increasing your savings rate.",
                years
            ),
        }
    }
}

impl std::fmt::Display for GoalPrediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

pub fn goal_prediction(goal: &Goal, transactions: &[Transaction]) -> GoalPrediction {
    let (income, expenses) = totals(transactions);
    let net = income - expenses;
    if net <= 0.0 {
        return GoalPrediction::NeedsMoreSavings;
    }

    let remaining = goal.target_amount - goal.saved_amount;
    let weeks = (remaining / net).ceil();
    if weeks <= 0.0 {
        GoalPrediction::AlreadyReached
    } else if weeks < 52.0 {
        GoalPrediction::Weeks(weeks as u64)
    } else {
        GoalPrediction::Years(weeks / 52.0)
    }
}
