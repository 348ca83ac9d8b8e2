//! Transaction command implementations

use anyhow::Result;
use chrono::NaiveDate;
use smartcents_core::{NewTransaction, Transaction};

use super::{truncate, App};

fn add(app: &mut App, mut new: NewTransaction, date: Option<NaiveDate>, note: Option<&str>) -> Result<Transaction> {
    new.date = date;
    new.note = note.map(str::to_string);

    let before = app.current_score()?;
    let tx = app.add_transaction(new)?;
    let after = app.current_score()?;

    println!(
        "✅ Recorded {} of ${:.2} ({}) on {}",
        tx.transaction_type, tx.amount, tx.category, tx.date
    );
    print_score_change(before, after);
    Ok(tx)
}

pub fn cmd_add_income(
    app: &mut App,
    amount: f64,
    category: &str,
    date: Option<NaiveDate>,
    note: Option<&str>,
) -> Result<()> {
    add(app, NewTransaction::income(amount, category), date, note)?;
    Ok(())
}

pub fn cmd_add_expense(
    app: &mut App,
    amount: f64,
    category: &str,
    date: Option<NaiveDate>,
    note: Option<&str>,
) -> Result<()> {
    add(app, NewTransaction::expense(amount, category), date, note)?;
    Ok(())
}

pub(crate) fn print_score_change(before: u8, after: u8) {
    let delta = i32::from(after) - i32::from(before);
    match delta {
        0 => println!("   Score: {}", after),
        d if d > 0 => println!("   Score: {} → {} (\x1b[32m+{}\x1b[0m)", before, after, d),
        d => println!("   Score: {} → {} (\x1b[31m{}\x1b[0m)", before, after, d),
    }
}

pub fn cmd_transactions_list(app: &App) -> Result<()> {
    let transactions = app.list_transactions()?;

    if transactions.is_empty() {
        println!("No transactions yet. Add one with:");
        println!("  smartcents add income 20 allowance");
        return Ok(());
    }

    println!();
    println!("📝 Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = if tx.is_expense() {
            format!("\x1b[31m-${:.2}\x1b[0m", tx.amount) // Red for expenses
        } else {
            format!("\x1b[32m+${:.2}\x1b[0m", tx.amount) // Green for income
        };

        let label = match &tx.note {
            Some(note) => format!("{} ({})", tx.category, note),
            None => tx.category.clone(),
        };

        println!(
            "   [{}] {} │ {:>10} │ {}",
            tx.id,
            tx.date,
            amount_str,
            truncate(&label, 40)
        );
    }

    Ok(())
}

pub fn cmd_transactions_reset(app: &mut App) -> Result<()> {
    let removed = app.reset_transactions()?;
    println!("🗑️  Removed {} transaction(s)", removed);
    Ok(())
}
