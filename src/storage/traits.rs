//! Sink trait and error types
//!
//! Every persistence backend implements the same `open`/`ingest`/`flush`/
//! `close` contract. Backends are independent adapters over a shared batching
//! helper; none inherits from another.

use crate::record::MatchRecord;
use thiserror::Error;

/// Errors that can occur during sink operations
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Sink used before open()")]
    NotOpen,

    #[error("Store was written by the '{found}' backend; refusing to open it as '{expected}'")]
    BackendMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// A relational destination for harvested matches
///
/// Calls arrive from a single writer task, so implementations need not be
/// `Sync`.
pub trait MatchSink: Send {
    /// Short backend name used in logs and the runs table
    fn name(&self) -> &'static str;

    /// Connects and ensures the schema exists
    ///
    /// Reopening a store this backend wrote is a no-op; a store written by a
    /// different backend is rejected with `SinkError::BackendMismatch`.
    fn open(&mut self) -> SinkResult<()>;

    /// Writes one match and everything it references in a single unit
    ///
    /// On error nothing from this record remains in the store.
    fn ingest(&mut self, record: &MatchRecord) -> SinkResult<()>;

    /// Commits the current batch
    fn flush(&mut self) -> SinkResult<()>;

    /// Commits anything pending and releases the connection
    fn close(&mut self) -> SinkResult<()>;
}
