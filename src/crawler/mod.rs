//! Crawler module for fetching and processing match listings
//!
//! This module contains the core crawling logic, including:
//! - Request plan generation and listing URL construction
//! - Listing table parsing with versioned column layouts
//! - HTTP transport with redirects surfaced as data
//! - Request admission (concurrency and pacing) and identity rotation
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod identity;
mod listing;
mod plan;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlReport, RunSummary, SINK_CHANNEL_CAPACITY};
pub use fetcher::{build_http_client, fetch_url, FetchResult, HttpTransport, Transport};
pub use identity::IdentityRotator;
pub use listing::{parse_listing, ColumnMap, ListingRow};
pub use plan::{listing_url, plan_tasks, CrawlTask};
pub use scheduler::Scheduler;
