//! Storage module for persisting harvested matches
//!
//! This module handles all database operations, including:
//! - Schema creation for the three table layouts
//! - Batched commits with one savepoint per match
//! - Get-or-create lookups for teams and players
//! - The single writer task that serializes sink access

mod batch;
mod document;
mod flat;
mod normalized;
mod schema;
mod traits;
mod writer;

pub use batch::{BatchWriter, RunStatus, IN_MEMORY};
pub use document::DocumentSink;
pub use flat::FlatSink;
pub use normalized::NormalizedSink;
pub use schema::table_exists;
pub use traits::{MatchSink, SinkError, SinkResult};
pub use writer::{spawn_sink_writer, SinkReport};

use crate::config::{SinkBackend, StorageConfig};

/// Builds the configured sink; it is opened later by the writer task
pub fn open_sink(config: &StorageConfig, config_hash: &str) -> Box<dyn MatchSink> {
    let path = config.database_path.as_str();
    match config.backend {
        SinkBackend::Flat => Box::new(FlatSink::new(path, config_hash)),
        SinkBackend::Document => Box::new(DocumentSink::new(path, config_hash)),
        SinkBackend::Normalized => Box::new(NormalizedSink::new(path, config_hash)),
    }
}
