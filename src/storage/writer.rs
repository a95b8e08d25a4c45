//! Single writer task in front of a sink
//!
//! Crawl workers send records over a bounded channel; one blocking task owns
//! the sink and serializes every write. A sink that fails to open degrades
//! the writer to discarding records, so storage trouble never stalls the crawl.

use crate::record::MatchRecord;
use crate::storage::traits::MatchSink;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What the writer did with the records it received
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkReport {
    pub backend: &'static str,
    /// Records written successfully
    pub ingested: u64,
    /// Records that failed to write
    pub dropped: u64,
    /// Records received while the sink was unavailable
    pub discarded: u64,
    /// True when `open()` failed and nothing was persisted
    pub degraded: bool,
}

/// Starts the writer task
///
/// The sink is flushed every `batch_size` ingested records and closed once
/// every sender has been dropped.
pub fn spawn_sink_writer(
    mut sink: Box<dyn MatchSink>,
    batch_size: usize,
    capacity: usize,
) -> (mpsc::Sender<MatchRecord>, JoinHandle<SinkReport>) {
    let (tx, mut rx) = mpsc::channel::<MatchRecord>(capacity.max(1));
    let batch_size = batch_size.max(1);

    let handle = tokio::task::spawn_blocking(move || {
        let mut report = SinkReport {
            backend: sink.name(),
            ..SinkReport::default()
        };

        if let Err(e) = sink.open() {
            tracing::error!(
                "Failed to open {} sink, records will be discarded: {}",
                report.backend,
                e
            );
            report.degraded = true;
            while rx.blocking_recv().is_some() {
                report.discarded += 1;
            }
            return report;
        }

        let mut pending = 0usize;
        while let Some(record) = rx.blocking_recv() {
            match sink.ingest(&record) {
                Ok(()) => {
                    report.ingested += 1;
                    pending += 1;
                }
                Err(e) => {
                    report.dropped += 1;
                    tracing::error!(
                        "Failed to store {} vs {} ({}): {}",
                        record.team,
                        record.opponent,
                        record.date,
                        e
                    );
                }
            }

            if pending >= batch_size {
                if let Err(e) = sink.flush() {
                    tracing::error!("Failed to commit batch: {}", e);
                }
                pending = 0;
            }
        }

        if let Err(e) = sink.close() {
            tracing::error!("Failed to close {} sink: {}", report.backend, e);
        }

        tracing::info!(
            "Sink {} closed: {} stored, {} dropped",
            report.backend,
            report.ingested,
            report.dropped
        );
        report
    });

    (tx, handle)
}
