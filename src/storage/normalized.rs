//! Normalized backend
//!
//! Teams and players are entities looked up by name (get-or-create) before
//! the match row is written. Each lineup entry becomes a `match_players` row,
//! each card a `card_events` row and each statistic a `match_statistics` row.
//! A record and all of its child rows share one savepoint.

use crate::record::MatchRecord;
use crate::storage::batch::BatchWriter;
use crate::storage::schema::NORMALIZED_SCHEMA_SQL;
use crate::storage::traits::{MatchSink, SinkResult};
use rusqlite::{params, Connection, OptionalExtension};

pub struct NormalizedSink {
    writer: BatchWriter,
}

impl NormalizedSink {
    pub fn new(path: impl Into<String>, config_hash: impl Into<String>) -> Self {
        Self {
            writer: BatchWriter::new(path, config_hash),
        }
    }
}

/// Returns the id of the team with this name, inserting it if absent
fn get_or_create_team(conn: &Connection, name: &str) -> SinkResult<i64> {
    get_or_create(conn, "teams", name)
}

/// Returns the id of the player with this name, inserting it if absent
fn get_or_create_player(conn: &Connection, name: &str) -> SinkResult<i64> {
    get_or_create(conn, "players", name)
}

fn get_or_create(conn: &Connection, table: &str, name: &str) -> SinkResult<i64> {
    let existing: Option<i64> = conn
        .query_row(
            &format!("SELECT id FROM {} WHERE name = ?1", table),
            params![name],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        &format!("INSERT INTO {} (name) VALUES (?1)", table),
        params![name],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_match(conn: &Connection, run_id: i64, record: &MatchRecord) -> SinkResult<()> {
    let team_id = get_or_create_team(conn, &record.team)?;
    let opponent_id = get_or_create_team(conn, &record.opponent)?;

    conn.execute(
        "INSERT INTO matches (run_id, team_id, opponent_id, year, date, competition, venue, result, score, is_rivalry, detail_url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            run_id,
            team_id,
            opponent_id,
            record.year,
            record.date,
            record.competition,
            record.venue,
            record.result,
            record.score,
            record.is_rivalry,
            record.detail_url,
        ],
    )?;
    let match_id = conn.last_insert_rowid();

    for (side, position, player) in record.lineups.iter() {
        let player_id = get_or_create_player(conn, &player.name)?;
        conn.execute(
            "INSERT INTO match_players (match_id, player_id, side, position) VALUES (?1, ?2, ?3, ?4)",
            params![match_id, player_id, side.to_db_string(), position as i64],
        )?;
        let match_player_id = conn.last_insert_rowid();

        for event in &player.events {
            conn.execute(
                "INSERT INTO card_events (match_player_id, card) VALUES (?1, ?2)",
                params![match_player_id, event.to_db_string()],
            )?;
        }
    }

    for (label, values) in record.statistics.iter() {
        conn.execute(
            "INSERT INTO match_statistics (match_id, label, home_value, away_value) VALUES (?1, ?2, ?3, ?4)",
            params![match_id, label, values.home, values.away],
        )?;
    }

    Ok(())
}

impl MatchSink for NormalizedSink {
    fn name(&self) -> &'static str {
        "normalized"
    }

    fn open(&mut self) -> SinkResult<()> {
        let name = self.name();
        self.writer.open(name, NORMALIZED_SCHEMA_SQL)
    }

    fn ingest(&mut self, record: &MatchRecord) -> SinkResult<()> {
        self.writer
            .write(|conn, run_id| insert_match(conn, run_id, record))
    }

    fn flush(&mut self) -> SinkResult<()> {
        self.writer.commit()
    }

    fn close(&mut self) -> SinkResult<()> {
        self.writer.close()
    }
}
