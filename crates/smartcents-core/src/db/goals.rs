//! Savings goal operations

use rusqlite::{params, OptionalExtension};

use super::{parse_date, parse_timestamp, Database};
use crate::error::Result;
use crate::models::Goal;

const GOAL_COLUMNS: &str = "id, name, target_amount, saved_amount, target_date, note, timestamp";

impl Database {
    /// Insert a goal, replacing any goal with the same id
    pub fn insert_goal(&self, goal: &Goal) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO goals (id, name, target_amount, saved_amount, target_date, note, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                goal.id,
                goal.name,
                goal.target_amount,
                goal.saved_amount,
                goal.target_date.map(|d| d.to_string()),
                goal.note,
                goal.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All goals, oldest first
    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM goals ORDER BY timestamp, rowid",
            GOAL_COLUMNS
        ))?;

        let goals = stmt
            .query_map([], Self::row_to_goal)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(goals)
    }

    pub fn get_goal(&self, id: &str) -> Result<Option<Goal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM goals WHERE id = ?", GOAL_COLUMNS))?;

        let goal = stmt.query_row(params![id], Self::row_to_goal).optional()?;

        Ok(goal)
    }

    /// Set a goal's saved amount, returning false if the goal doesn't exist
    pub fn update_goal_saved(&self, id: &str, saved_amount: f64) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE goals SET saved_amount = ? WHERE id = ?",
            params![saved_amount, id],
        )?;
        Ok(updated > 0)
    }

    pub fn delete_goal(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM goals WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    pub fn clear_goals(&self) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM goals", [])?;
        Ok(removed)
    }

    fn row_to_goal(row: &rusqlite::Row) -> rusqlite::Result<Goal> {
        let target_date_str: Option<String> = row.get(4)?;
        let timestamp_str: String = row.get(6)?;
        Ok(Goal {
            id: row.get(0)?,
            name: row.get(1)?,
            target_amount: row.get(2)?,
            saved_amount: row.get(3)?,
            target_date: target_date_str.as_deref().map(parse_date),
            note: row.get(5)?,
            timestamp: parse_timestamp(&timestamp_str),
        })
    }
}
