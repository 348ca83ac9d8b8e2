//! Transaction operations

use rusqlite::{params, OptionalExtension};

use super::{parse_date, parse_timestamp, Database};
use crate::error::Result;
use crate::models::Transaction;

const TRANSACTION_COLUMNS: &str = "id, type, amount, category, date, note, timestamp";

impl Database {
    /// Insert a transaction, returning the new row id
    pub fn insert_transaction(&self, tx: &Transaction) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO transactions (type, amount, category, date, note, timestamp)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                tx.transaction_type.as_str(),
                tx.amount,
                tx.category,
                tx.date.to_string(),
                tx.note,
                tx.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// All transactions in insertion order
    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions ORDER BY id",
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map([], Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE id = ?",
            TRANSACTION_COLUMNS
        ))?;

        let transaction = stmt
            .query_row(params![id], Self::row_to_transaction)
            .optional()?;

        Ok(transaction)
    }

    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete every transaction, returning how many were removed
    pub fn clear_transactions(&self) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM transactions", [])?;
        Ok(removed)
    }

    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let type_str: String = row.get(1)?;
        let date_str: String = row.get(4)?;
        let timestamp_str: String = row.get(6)?;
        let transaction_type = type_str.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                e.into(),
            )
        })?;
        Ok(Transaction {
            id: row.get(0)?,
            transaction_type,
            amount: row.get(2)?,
            category: row.get(3)?,
            date: parse_date(&date_str),
            note: row.get(5)?,
            timestamp: parse_timestamp(&timestamp_str),
        })
    }
}
