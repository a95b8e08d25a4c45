//! Output module for run summaries and stored statistics
//!
//! This module handles:
//! - Printing the end-of-run summary
//! - Reading row counts back from a harvest database

pub mod stats;

pub use stats::{load_statistics, print_statistics, HarvestStatistics, RunInfo};

use crate::crawler::RunSummary;

/// Prints the end-of-run summary to stdout
pub fn print_run_summary(summary: &RunSummary) {
    let crawl = &summary.crawl;
    let sink = &summary.sink;

    println!("=== Harvest Summary ===\n");

    if crawl.cancelled {
        println!("Run was cancelled before all tasks finished.\n");
    }

    println!("Crawl:");
    println!(
        "  Listing tasks: {} planned, {} completed, {} failed",
        crawl.tasks_planned, crawl.tasks_completed, crawl.tasks_failed
    );
    println!("  Records emitted: {}", crawl.records_emitted);
    if crawl.records_filtered > 0 {
        println!("  Filtered (not a rivalry): {}", crawl.records_filtered);
    }
    println!("  Match reports failed: {}", crawl.details_failed);
    println!("  Block signals: {}", crawl.block_signals);
    println!();

    println!("Storage ({}):", sink.backend);
    if sink.degraded {
        println!(
            "  Sink unavailable; {} records were discarded",
            sink.discarded
        );
    } else {
        println!("  Stored: {}", sink.ingested);
        println!("  Dropped: {}", sink.dropped);
    }
}
