//! Batched, per-match transactional writes shared by every backend
//!
//! One outer transaction spans a batch; each match is written inside its own
//! savepoint so a failure rolls back that match alone. `commit` ends the
//! batch, `close` commits and finalizes the run row.

use crate::storage::schema::{initialize_schema, RUNS_SQL};
use crate::storage::traits::{SinkError, SinkResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Path that selects a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// Status of a persisted run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Connection plus batch bookkeeping for one sink
#[derive(Debug)]
pub struct BatchWriter {
    path: String,
    config_hash: String,
    conn: Option<Connection>,
    run_id: Option<i64>,
    in_batch: bool,
    ingested: u64,
}

impl BatchWriter {
    pub fn new(path: impl Into<String>, config_hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            config_hash: config_hash.into(),
            conn: None,
            run_id: None,
            in_batch: false,
            ingested: 0,
        }
    }

    /// Opens the database, creates the schema and registers a run
    ///
    /// The layouts share table names, so a store keeps the backend of its
    /// first run.
    pub fn open(&mut self, backend: &'static str, schema_sql: &str) -> SinkResult<()> {
        let conn = if self.path == IN_MEMORY {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = Path::new(&self.path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let conn = Connection::open(&self.path)?;
            conn.execute_batch(
                "
                PRAGMA journal_mode = WAL;
                PRAGMA synchronous = NORMAL;
                PRAGMA temp_store = MEMORY;
            ",
            )?;
            conn
        };
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        conn.execute_batch(RUNS_SQL)?;
        if let Some(found) = foreign_backend(&conn, backend)? {
            return Err(SinkError::BackendMismatch {
                expected: backend,
                found,
            });
        }

        initialize_schema(&conn, schema_sql)?;

        conn.execute(
            "INSERT INTO runs (started_at, config_hash, backend, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                Utc::now().to_rfc3339(),
                self.config_hash,
                backend,
                RunStatus::Running.to_db_string()
            ],
        )?;
        self.run_id = Some(conn.last_insert_rowid());
        self.conn = Some(conn);

        Ok(())
    }

    /// Runs `write` inside a savepoint of the current batch
    ///
    /// The closure receives the connection and the run id. If it fails, every
    /// statement it executed is rolled back and its error is returned.
    pub fn write<F>(&mut self, write: F) -> SinkResult<()>
    where
        F: FnOnce(&Connection, i64) -> SinkResult<()>,
    {
        let conn = self.conn.as_ref().ok_or(SinkError::NotOpen)?;
        let run_id = self.run_id.ok_or(SinkError::NotOpen)?;

        if !self.in_batch {
            conn.execute_batch("BEGIN")?;
            self.in_batch = true;
        }

        conn.execute_batch("SAVEPOINT match_write")?;
        match write(conn, run_id) {
            Ok(()) => {
                conn.execute_batch("RELEASE match_write")?;
                self.ingested += 1;
                Ok(())
            }
            Err(e) => {
                conn.execute_batch("ROLLBACK TO match_write; RELEASE match_write")?;
                Err(e)
            }
        }
    }

    /// Commits the open batch, if any
    pub fn commit(&mut self) -> SinkResult<()> {
        let conn = self.conn.as_ref().ok_or(SinkError::NotOpen)?;
        if self.in_batch {
            conn.execute_batch("COMMIT")?;
            self.in_batch = false;
        }
        Ok(())
    }

    /// Commits, marks the run completed and releases the connection
    pub fn close(&mut self) -> SinkResult<()> {
        if self.conn.is_none() {
            return Ok(());
        }
        self.commit()?;

        if let (Some(conn), Some(run_id)) = (self.conn.as_ref(), self.run_id) {
            conn.execute(
                "UPDATE runs SET status = ?1, finished_at = ?2, ingested = ?3 WHERE id = ?4",
                params![
                    RunStatus::Completed.to_db_string(),
                    Utc::now().to_rfc3339(),
                    self.ingested as i64,
                    run_id
                ],
            )?;
        }

        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| SinkError::Sqlite(e))?;
        }
        Ok(())
    }

    pub fn connection(&self) -> SinkResult<&Connection> {
        self.conn.as_ref().ok_or(SinkError::NotOpen)
    }

    pub fn run_id(&self) -> Option<i64> {
        self.run_id
    }

    /// Matches written successfully since `open`
    pub fn ingested(&self) -> u64 {
        self.ingested
    }
}

/// Backend of an earlier run that differs from `backend`, if any
fn foreign_backend(conn: &Connection, backend: &str) -> SinkResult<Option<String>> {
    let found = conn
        .query_row(
            "SELECT backend FROM runs WHERE backend != ?1 ORDER BY id LIMIT 1",
            [backend],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found)
}
