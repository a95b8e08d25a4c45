//! Match table with embedded JSON documents
//!
//! Lineups and statistics are stored as JSON text next to the listing
//! fields, one row per record.

use crate::record::MatchRecord;
use crate::storage::batch::BatchWriter;
use crate::storage::schema::DOCUMENT_SCHEMA_SQL;
use crate::storage::traits::{MatchSink, SinkResult};
use rusqlite::params;

pub struct DocumentSink {
    writer: BatchWriter,
}

impl DocumentSink {
    pub fn new(path: impl Into<String>, config_hash: impl Into<String>) -> Self {
        Self {
            writer: BatchWriter::new(path, config_hash),
        }
    }
}

impl MatchSink for DocumentSink {
    fn name(&self) -> &'static str {
        "document"
    }

    fn open(&mut self) -> SinkResult<()> {
        let name = self.name();
        self.writer.open(name, DOCUMENT_SCHEMA_SQL)
    }

    fn ingest(&mut self, record: &MatchRecord) -> SinkResult<()> {
        let lineups = serde_json::to_string(&record.lineups)?;
        let statistics = serde_json::to_string(&record.statistics)?;

        self.writer.write(|conn, run_id| {
            conn.execute(
                "INSERT INTO matches (run_id, team, year, date, competition, opponent, venue, result, score, is_rivalry, detail_url, lineups, statistics)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    run_id,
                    record.team,
                    record.year,
                    record.date,
                    record.competition,
                    record.opponent,
                    record.venue,
                    record.result,
                    record.score,
                    record.is_rivalry,
                    record.detail_url,
                    lineups,
                    statistics,
                ],
            )?;
            Ok(())
        })
    }

    fn flush(&mut self) -> SinkResult<()> {
        self.writer.commit()
    }

    fn close(&mut self) -> SinkResult<()> {
        self.writer.close()
    }
}
