//! Single-table backend
//!
//! One `matches` row per record with the listing fields. Lineups and
//! statistics are not stored.

use crate::record::MatchRecord;
use crate::storage::batch::BatchWriter;
use crate::storage::schema::FLAT_SCHEMA_SQL;
use crate::storage::traits::{MatchSink, SinkResult};
use rusqlite::params;

pub struct FlatSink {
    writer: BatchWriter,
}

impl FlatSink {
    pub fn new(path: impl Into<String>, config_hash: impl Into<String>) -> Self {
        Self {
            writer: BatchWriter::new(path, config_hash),
        }
    }
}

impl MatchSink for FlatSink {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn open(&mut self) -> SinkResult<()> {
        let name = self.name();
        self.writer.open(name, FLAT_SCHEMA_SQL)
    }

    fn ingest(&mut self, record: &MatchRecord) -> SinkResult<()> {
        self.writer.write(|conn, run_id| {
            conn.execute(
                "INSERT INTO matches (run_id, team, year, date, competition, opponent, venue, result, score, is_rivalry, detail_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
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
