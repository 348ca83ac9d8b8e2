//! Score history series

use rusqlite::{params, Transaction};

use super::Database;
use crate::error::Result;
use crate::models::{Granularity, ScoreSnapshot};

impl Database {
    /// A series in ascending time key order
    pub fn load_series(&self, granularity: Granularity) -> Result<Vec<ScoreSnapshot>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT time_key, score FROM score_snapshots
             WHERE granularity = ?
             ORDER BY time_key",
        )?;

        let snapshots = stmt
            .query_map(params![granularity.as_str()], |row| {
                let score: i64 = row.get(1)?;
                Ok(ScoreSnapshot {
                    time_key: row.get(0)?,
                    score: score.clamp(0, 100) as u8,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(snapshots)
    }

    /// Replace a series in one transaction
    pub fn save_series(&self, granularity: Granularity, snapshots: &[ScoreSnapshot]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        replace_series(&tx, granularity, snapshots)?;
        tx.commit()?;
        Ok(())
    }

    /// Replace the hourly and minute series in one transaction
    pub fn save_history(&self, hourly: &[ScoreSnapshot], minute: &[ScoreSnapshot]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        replace_series(&tx, Granularity::Hour, hourly)?;
        replace_series(&tx, Granularity::Minute, minute)?;
        tx.commit()?;
        Ok(())
    }
}

fn replace_series(
    tx: &Transaction<'_>,
    granularity: Granularity,
    snapshots: &[ScoreSnapshot],
) -> Result<()> {
    tx.execute(
        "DELETE FROM score_snapshots WHERE granularity = ?",
        params![granularity.as_str()],
    )?;
    let mut stmt = tx.prepare(
        "INSERT INTO score_snapshots (granularity, time_key, score) VALUES (?, ?, ?)",
    )?;
    for snapshot in snapshots {
        stmt.execute(params![
            granularity.as_str(),
            snapshot.time_key,
            snapshot.score as i64
        ])?;
    }
    Ok(())
}
