//! Database schema definitions
//!
//! Every backend shares the `runs` table; each then adds its own match layout.
//! All statements are create-if-absent so opening an existing store is a no-op.

/// Run bookkeeping shared by all backends
pub const RUNS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    backend TEXT NOT NULL,
    status TEXT NOT NULL,
    ingested INTEGER NOT NULL DEFAULT 0
);
"#;

/// Single-table layout with the listing fields only
pub const FLAT_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS matches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    team TEXT NOT NULL,
    year INTEGER NOT NULL,
    date TEXT NOT NULL,
    competition TEXT NOT NULL,
    opponent TEXT NOT NULL,
    venue TEXT NOT NULL,
    result TEXT NOT NULL,
    score TEXT NOT NULL,
    is_rivalry INTEGER,
    detail_url TEXT
);

CREATE INDEX IF NOT EXISTS idx_matches_team_year ON matches(team, year);
"#;

/// Match table with lineups and statistics as JSON documents
pub const DOCUMENT_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS matches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    team TEXT NOT NULL,
    year INTEGER NOT NULL,
    date TEXT NOT NULL,
    competition TEXT NOT NULL,
    opponent TEXT NOT NULL,
    venue TEXT NOT NULL,
    result TEXT NOT NULL,
    score TEXT NOT NULL,
    is_rivalry INTEGER,
    detail_url TEXT,
    lineups TEXT NOT NULL,
    statistics TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_matches_team_year ON matches(team, year);
"#;

/// Teams and players as entities, lineups and cards as child rows
pub const NORMALIZED_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS teams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS players (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS matches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    team_id INTEGER NOT NULL REFERENCES teams(id),
    opponent_id INTEGER NOT NULL REFERENCES teams(id),
    year INTEGER NOT NULL,
    date TEXT NOT NULL,
    competition TEXT NOT NULL,
    venue TEXT NOT NULL,
    result TEXT NOT NULL,
    score TEXT NOT NULL,
    is_rivalry INTEGER,
    detail_url TEXT
);

CREATE INDEX IF NOT EXISTS idx_matches_team ON matches(team_id, year);

CREATE TABLE IF NOT EXISTS match_players (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    match_id INTEGER NOT NULL REFERENCES matches(id),
    player_id INTEGER NOT NULL REFERENCES players(id),
    side TEXT NOT NULL,
    position INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_match_players_match ON match_players(match_id);

CREATE TABLE IF NOT EXISTS card_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    match_player_id INTEGER NOT NULL REFERENCES match_players(id),
    card TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS match_statistics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    match_id INTEGER NOT NULL REFERENCES matches(id),
    label TEXT NOT NULL,
    home_value TEXT,
    away_value TEXT,
    UNIQUE(match_id, label)
);
"#;

/// Creates the runs table plus a backend's match layout
pub fn initialize_schema(
    conn: &rusqlite::Connection,
    backend_sql: &str,
) -> Result<(), rusqlite::Error> {
    conn.execute_batch(RUNS_SQL)?;
    conn.execute_batch(backend_sql)?;
    Ok(())
}

/// Whether a table exists in the connected database
pub fn table_exists(conn: &rusqlite::Connection, table: &str) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_every_layout_initializes_twice() {
        for sql in [FLAT_SCHEMA_SQL, DOCUMENT_SCHEMA_SQL, NORMALIZED_SCHEMA_SQL] {
            let conn = Connection::open_in_memory().unwrap();
            initialize_schema(&conn, sql).unwrap();
            assert!(initialize_schema(&conn, sql).is_ok());
        }
    }

    #[test]
    fn test_normalized_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn, NORMALIZED_SCHEMA_SQL).unwrap();

        for table in [
            "runs",
            "teams",
            "players",
            "matches",
            "match_players",
            "card_events",
            "match_statistics",
        ] {
            assert!(table_exists(&conn, table).unwrap(), "Table {} should exist", table);
        }
        assert!(!table_exists(&conn, "jogos").unwrap());
    }
}
