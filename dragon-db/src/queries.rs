//! Read queries against the fact table.

use chrono::NaiveDate;
use dragon_core::FactRecord;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};

use crate::loader::{LoadError, month_key};

/// Summary of the fact table's contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactStats {
    pub records: i64,
    pub games: i64,
}

/// Number of rows and distinct games in the fact table.
pub fn fact_stats(conn: &Connection) -> Result<FactStats, LoadError> {
    Ok(conn.query_row(
        "SELECT COUNT(*), COUNT(DISTINCT game_id) FROM games_monthly_viewers",
        [],
        |row| {
            Ok(FactStats {
                records: row.get(0)?,
                games: row.get(1)?,
            })
        },
    )?)
}

/// All records for `game_id`, oldest month first.
pub fn facts_for_game(conn: &Connection, game_id: &str) -> Result<Vec<FactRecord>, LoadError> {
    let mut stmt = conn.prepare(
        "SELECT game_id, month, viewer_count, viewer_count_peak, stream_count
         FROM games_monthly_viewers WHERE game_id = ?1 ORDER BY month",
    )?;
    let rows = stmt.query_map(params![game_id], row_to_fact)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// The record for one game and month, if loaded.
pub fn find_fact(
    conn: &Connection,
    game_id: &str,
    month: NaiveDate,
) -> Result<Option<FactRecord>, LoadError> {
    let mut stmt = conn.prepare(
        "SELECT game_id, month, viewer_count, viewer_count_peak, stream_count
         FROM games_monthly_viewers WHERE game_id = ?1 AND month = ?2",
    )?;
    let mut rows = stmt.query_map(params![game_id, month_key(month)], row_to_fact)?;
    rows.next().transpose().map_err(Into::into)
}

fn row_to_fact(row: &Row<'_>) -> rusqlite::Result<FactRecord> {
    let month: String = row.get(1)?;
    let month = NaiveDate::parse_from_str(&month, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    Ok(FactRecord {
        game_id: row.get(0)?,
        month,
        viewer_count: row.get(2)?,
        viewer_count_peak: row.get(3)?,
        stream_count: row.get(4)?,
    })
}
