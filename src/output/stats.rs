//! Statistics read back from a harvest database
//!
//! Works against any of the three table layouts: tables a layout does not
//! have are reported as zero.

use crate::storage::{table_exists, RunStatus, SinkResult};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::Path;

/// The most recent run recorded in the database
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub backend: String,
    pub status: Option<RunStatus>,
    pub ingested: u64,
}

impl RunInfo {
    /// Wall-clock duration, if the run finished
    pub fn duration_seconds(&self) -> Option<i64> {
        let started = self.started_at.parse::<DateTime<Utc>>().ok()?;
        let finished = self.finished_at.as_ref()?.parse::<DateTime<Utc>>().ok()?;
        Some((finished - started).num_seconds())
    }
}

/// Row counts for a harvest database
#[derive(Debug, Clone, Default)]
pub struct HarvestStatistics {
    pub runs: u64,
    pub matches: u64,
    pub teams: u64,
    pub players: u64,
    pub lineup_entries: u64,
    pub card_events: u64,
    pub statistics_rows: u64,
    pub latest_run: Option<RunInfo>,
}

fn count_rows(conn: &Connection, table: &str) -> SinkResult<u64> {
    if !table_exists(conn, table)? {
        return Ok(0);
    }
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(count.max(0) as u64)
}

fn latest_run(conn: &Connection) -> SinkResult<Option<RunInfo>> {
    if !table_exists(conn, "runs")? {
        return Ok(None);
    }

    let run = conn
        .query_row(
            "SELECT id, started_at, finished_at, backend, status, ingested FROM runs ORDER BY id DESC LIMIT 1",
            [],
            |row| {
                Ok(RunInfo {
                    id: row.get(0)?,
                    started_at: row.get(1)?,
                    finished_at: row.get(2)?,
                    backend: row.get(3)?,
                    status: RunStatus::from_db_string(&row.get::<_, String>(4)?),
                    ingested: row.get::<_, i64>(5)?.max(0) as u64,
                })
            },
        )
        .optional()?;

    Ok(run)
}

/// Loads statistics from an existing database
///
/// The file is never created; a missing database is an error.
pub fn load_statistics(path: &Path) -> SinkResult<HarvestStatistics> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
    statistics_from_connection(&conn)
}

/// Collects statistics over an open connection
pub fn statistics_from_connection(conn: &Connection) -> SinkResult<HarvestStatistics> {
    Ok(HarvestStatistics {
        runs: count_rows(conn, "runs")?,
        matches: count_rows(conn, "matches")?,
        teams: count_rows(conn, "teams")?,
        players: count_rows(conn, "players")?,
        lineup_entries: count_rows(conn, "match_players")?,
        card_events: count_rows(conn, "card_events")?,
        statistics_rows: count_rows(conn, "match_statistics")?,
        latest_run: latest_run(conn)?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Runs: {}", stats.runs);
    println!("  Matches: {}", stats.matches);
    println!("  Teams: {}", stats.teams);
    println!("  Players: {}", stats.players);
    println!("  Lineup entries: {}", stats.lineup_entries);
    println!("  Card events: {}", stats.card_events);
    println!("  Statistics rows: {}", stats.statistics_rows);
    println!();

    if let Some(run) = &stats.latest_run {
        println!("Latest Run (#{}):", run.id);
        println!("  Backend: {}", run.backend);
        println!(
            "  Status: {}",
            run.status.map(|s| s.to_db_string()).unwrap_or("unknown")
        );
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        if let Some(seconds) = run.duration_seconds() {
            println!("  Duration: {}s", seconds);
        }
        println!("  Matches stored: {}", run.ingested);
    }
}
