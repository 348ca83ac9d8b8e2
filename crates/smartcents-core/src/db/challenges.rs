//! Daily challenge set persistence
//!
//! A day's set is stored as one JSON document so progress and completion
//! flags round-trip exactly.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;
use crate::models::ChallengeInstance;

impl Database {
    pub fn load_challenges(&self, date: NaiveDate) -> Result<Option<Vec<ChallengeInstance>>> {
        let conn = self.conn()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT challenges FROM daily_challenges WHERE date = ?",
                params![date.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Store the set for a day, replacing whatever was there
    pub fn save_challenges(&self, date: NaiveDate, challenges: &[ChallengeInstance]) -> Result<()> {
        let json = serde_json::to_string(challenges)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO daily_challenges (date, challenges) VALUES (?, ?)
             ON CONFLICT(date) DO UPDATE SET challenges = excluded.challenges,
                                             updated_at = CURRENT_TIMESTAMP",
            params![date.to_string(), json],
        )?;
        Ok(())
    }

    pub fn remove_challenges(&self, date: NaiveDate) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM daily_challenges WHERE date = ?",
            params![date.to_string()],
        )?;
        Ok(())
    }
}
