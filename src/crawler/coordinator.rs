//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator expands the configuration into listing tasks, runs them on
//! a bounded pool of tokio tasks, follows each listed match to its report page
//! and hands the merged records to the sink writer. Every request goes through
//! the same gate: backoff barrier, then scheduler permit, then a rotated
//! identity. Nothing below the per-task loop is fatal to the run.

use crate::config::Config;
use crate::crawler::fetcher::{FetchResult, HttpTransport, Transport};
use crate::crawler::identity::IdentityRotator;
use crate::crawler::listing::{parse_listing, ColumnMap, ListingRow};
use crate::crawler::plan::{listing_url, plan_tasks, CrawlTask};
use crate::crawler::scheduler::Scheduler;
use crate::derby::DerbyTable;
use crate::extract::extract_detail;
use crate::record::MatchRecord;
use crate::state::BackoffController;
use crate::storage::{open_sink, spawn_sink_writer, SinkReport};
use crate::{HarvestError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Records buffered between the crawl and the sink writer
pub const SINK_CHANNEL_CAPACITY: usize = 256;

/// Outcome counters for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub tasks_planned: usize,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub records_emitted: u64,
    /// Rows discarded by the rivalry filter
    pub records_filtered: u64,
    /// Match reports that could not be fetched; their records were dropped
    pub details_failed: u64,
    pub block_signals: u64,
    pub cancelled: bool,
}

/// What came back from a gated fetch
enum Fetched {
    Body(String),
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskOutcome {
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Default)]
struct Counters {
    tasks_completed: AtomicU64,
    tasks_failed: AtomicU64,
    records_emitted: AtomicU64,
    records_filtered: AtomicU64,
    details_failed: AtomicU64,
}

/// State shared by every worker task
struct CrawlContext {
    config: Config,
    base_url: Url,
    columns: ColumnMap,
    derby: DerbyTable,
    transport: Arc<dyn Transport>,
    identity: IdentityRotator,
    backoff: BackoffController,
    scheduler: Scheduler,
    sink: mpsc::Sender<MatchRecord>,
    cancel: CancellationToken,
    counters: Counters,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    ctx: Arc<CrawlContext>,
    tasks: Vec<CrawlTask>,
}

impl Coordinator {
    /// Creates a coordinator over an arbitrary transport
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `transport` - Fetcher used for every listing and report request
    /// * `sink` - Channel feeding the sink writer
    /// * `cancel` - Token checked at every task boundary
    pub fn new(
        config: Config,
        transport: Arc<dyn Transport>,
        sink: mpsc::Sender<MatchRecord>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let base_url = Url::parse(&config.crawler.base_url)?;
        let tasks = plan_tasks(&config.crawler);

        let ctx = CrawlContext {
            base_url,
            columns: ColumnMap::from_config(&config.listing),
            derby: DerbyTable::from_config(&config.derby_groups),
            transport,
            identity: IdentityRotator::new(config.user_agent.pool.clone()),
            backoff: BackoffController::from_config(&config.backoff),
            scheduler: Scheduler::from_config(&config.crawler),
            sink,
            cancel,
            counters: Counters::default(),
            config,
        };

        Ok(Self {
            ctx: Arc::new(ctx),
            tasks,
        })
    }

    /// Creates a coordinator that fetches over HTTP
    pub fn with_http(
        config: Config,
        sink: mpsc::Sender<MatchRecord>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let timeout = Duration::from_secs(config.crawler.request_timeout);
        let transport = HttpTransport::new(timeout)?;
        Self::new(config, Arc::new(transport), sink, cancel)
    }

    /// The planned listing tasks, in issuance order
    pub fn tasks(&self) -> &[CrawlTask] {
        &self.tasks
    }

    /// Runs every planned task and returns the run report
    ///
    /// At most `max-concurrent-requests` listing tasks are in progress at once.
    /// Cancellation stops new tasks from starting; tasks already running wind
    /// down at their next fetch.
    pub async fn run(self) -> CrawlReport {
        let Self { ctx, tasks } = self;
        let planned = tasks.len();
        let limit = (ctx.config.crawler.max_concurrent_requests as usize).max(1);
        let start_time = Instant::now();

        tracing::info!(
            "Starting crawl: {} listing tasks for {} team(s), {}-{}",
            planned,
            ctx.config.crawler.teams.len(),
            ctx.config.crawler.start_year,
            ctx.config.crawler.end_year
        );

        let mut workers = JoinSet::new();
        let mut finished = 0usize;
        let mut cancelled = false;

        for task in tasks {
            if ctx.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            while workers.len() >= limit {
                if let Some(joined) = workers.join_next().await {
                    cancelled |= ctx.settle(joined);
                    finished += 1;
                    ctx.log_progress(finished, planned, start_time);
                }
            }

            let worker = Arc::clone(&ctx);
            workers.spawn(async move { worker.process_task(task).await });
        }

        while let Some(joined) = workers.join_next().await {
            cancelled |= ctx.settle(joined);
            finished += 1;
            ctx.log_progress(finished, planned, start_time);
        }

        let counters = &ctx.counters;
        let report = CrawlReport {
            tasks_planned: planned,
            tasks_completed: counters.tasks_completed.load(Ordering::Relaxed),
            tasks_failed: counters.tasks_failed.load(Ordering::Relaxed),
            records_emitted: counters.records_emitted.load(Ordering::Relaxed),
            records_filtered: counters.records_filtered.load(Ordering::Relaxed),
            details_failed: counters.details_failed.load(Ordering::Relaxed),
            block_signals: ctx.backoff.total_blocks(),
            cancelled: cancelled || ctx.cancel.is_cancelled(),
        };

        tracing::info!(
            "Crawl {} in {:?}: {}/{} tasks completed, {} failed, {} records emitted, {} filtered, {} reports failed, {} block signals",
            if report.cancelled { "cancelled" } else { "finished" },
            start_time.elapsed(),
            report.tasks_completed,
            report.tasks_planned,
            report.tasks_failed,
            report.records_emitted,
            report.records_filtered,
            report.details_failed,
            report.block_signals
        );

        report
    }
}

impl CrawlContext {
    /// Folds a finished worker into the counters; returns true if it was cancelled
    fn settle(&self, joined: std::result::Result<TaskOutcome, JoinError>) -> bool {
        match joined {
            Ok(TaskOutcome::Completed) => {
                self.counters.tasks_completed.fetch_add(1, Ordering::Relaxed);
                false
            }
            Ok(TaskOutcome::Failed) => {
                self.counters.tasks_failed.fetch_add(1, Ordering::Relaxed);
                false
            }
            Ok(TaskOutcome::Cancelled) => true,
            Err(e) => {
                tracing::error!("Listing task aborted: {}", e);
                self.counters.tasks_failed.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    fn log_progress(&self, finished: usize, planned: usize, start_time: Instant) {
        if finished % 10 == 0 {
            let rate = finished as f64 / start_time.elapsed().as_secs_f64().max(f64::EPSILON);
            tracing::info!(
                "Progress: {}/{} listing tasks, {} records emitted, {:.2} tasks/sec",
                finished,
                planned,
                self.counters.records_emitted.load(Ordering::Relaxed),
                rate
            );
        }
    }

    /// Fetches one listing page and everything it links to
    async fn process_task(self: Arc<Self>, task: CrawlTask) -> TaskOutcome {
        if self.cancel.is_cancelled() {
            return TaskOutcome::Cancelled;
        }

        let url = match listing_url(&self.base_url, &task, self.config.crawler.end_year) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    "Cannot build listing URL for {} {}: {}",
                    task.team_id,
                    task.year,
                    e
                );
                return TaskOutcome::Failed;
            }
        };

        let body = match self.fetch(&url).await {
            Fetched::Body(body) => body,
            Fetched::Failed => return TaskOutcome::Failed,
            Fetched::Cancelled => return TaskOutcome::Cancelled,
        };

        let rows = parse_listing(&body, &url, &task, &self.columns);
        if rows.is_empty() {
            tracing::info!(
                "No matches listed for {} in {} (page {})",
                task.team_id,
                task.year,
                task.page
            );
            return TaskOutcome::Completed;
        }

        tracing::debug!(
            "{} rows on {} {} page {}",
            rows.len(),
            task.team_id,
            task.year,
            task.page
        );

        let mut reports = JoinSet::new();

        for ListingRow {
            mut record,
            detail_url,
        } in rows
        {
            if self.config.crawler.rivalry_only {
                if !self.derby.is_rivalry(&task.team_id, &record.opponent) {
                    tracing::debug!(
                        "Skipping {} vs {}: not a rivalry",
                        task.team_id,
                        record.opponent
                    );
                    self.counters.records_filtered.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
                record.is_rivalry = Some(true);
            }

            match detail_url {
                None => self.emit(record).await,
                Some(detail_url) => {
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    let worker = Arc::clone(&self);
                    reports.spawn(async move { worker.enrich_and_emit(record, detail_url).await });
                }
            }
        }

        while let Some(joined) = reports.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Match report task aborted: {}", e);
                self.counters.details_failed.fetch_add(1, Ordering::Relaxed);
            }
        }

        if self.cancel.is_cancelled() {
            TaskOutcome::Cancelled
        } else {
            TaskOutcome::Completed
        }
    }

    /// Fetches a match report, merges it into the record and emits it
    ///
    /// A report that cannot be fetched drops the record; a report that
    /// matches no layout still emits it with empty lineups.
    async fn enrich_and_emit(self: Arc<Self>, mut record: MatchRecord, detail_url: Url) {
        match self.fetch(&detail_url).await {
            Fetched::Body(body) => {
                let detail = extract_detail(&body);
                if detail.layout.is_none() {
                    tracing::info!("No lineup layout matched on {}", detail_url);
                }
                record.enrich(detail.lineups, detail.statistics);
                self.emit(record).await;
            }
            Fetched::Failed => {
                self.counters.details_failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    "Dropping {} vs {} ({}): match report unavailable",
                    record.team,
                    record.opponent,
                    record.date
                );
            }
            Fetched::Cancelled => {
                tracing::debug!("Abandoning {} after cancellation", detail_url);
            }
        }
    }

    async fn emit(&self, record: MatchRecord) {
        match self.sink.send(record).await {
            Ok(()) => {
                self.counters.records_emitted.fetch_add(1, Ordering::Relaxed);
            }
            Err(mpsc::error::SendError(record)) => {
                tracing::error!(
                    "Sink writer is gone; dropping {} vs {} ({})",
                    record.team,
                    record.opponent,
                    record.date
                );
            }
        }
    }

    /// Issues one request through the backoff barrier and the scheduler
    ///
    /// Block signals feed the backoff controller. A blocked unit waits out the
    /// pause and is then reported as failed, unless `max-block-retries` allows
    /// re-issuing it. Any other response resets the block counter. Transport
    /// failures are not retried.
    async fn fetch(&self, url: &Url) -> Fetched {
        let max_retries = self.config.backoff.max_block_retries;
        let mut retries = 0u32;

        loop {
            if !self.backoff.wait_ready(&self.cancel).await {
                return Fetched::Cancelled;
            }

            let Some(permit) = self.scheduler.acquire().await else {
                return Fetched::Cancelled;
            };

            // Another worker hit a block while this one waited for a slot
            if self.backoff.is_paused() {
                drop(permit);
                continue;
            }
            if self.cancel.is_cancelled() {
                return Fetched::Cancelled;
            }

            let user_agent = self.identity.pick();
            tracing::debug!("Fetching {}", url);
            let result = self.transport.fetch(url, user_agent).await;
            drop(permit);

            if let Some(status) = result.status_code() {
                if self.config.backoff.block_statuses.contains(&status) {
                    self.backoff.record_block(url.as_str());
                    if retries >= max_retries {
                        if !self.backoff.wait_ready(&self.cancel).await {
                            return Fetched::Cancelled;
                        }
                        tracing::warn!(
                            "Skipping {} after {} blocked attempt(s)",
                            url,
                            retries + 1
                        );
                        return Fetched::Failed;
                    }
                    retries += 1;
                    continue;
                }
                self.backoff.record_response();
            }

            return match result {
                FetchResult::Success { body, .. } => Fetched::Body(body),
                FetchResult::Redirect {
                    status_code,
                    location,
                } => {
                    tracing::warn!(
                        "Unexpected redirect {} from {} to {}",
                        status_code,
                        url,
                        location.as_deref().unwrap_or("<none>")
                    );
                    Fetched::Failed
                }
                FetchResult::HttpError { status_code } => {
                    tracing::warn!("HTTP {} fetching {}", status_code, url);
                    Fetched::Failed
                }
                FetchResult::NetworkError { error } => {
                    tracing::warn!("Failed to fetch {}: {}", url, error);
                    Fetched::Failed
                }
            };
        }
    }
}

/// Totals for a complete run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub crawl: CrawlReport,
    pub sink: SinkReport,
}

/// Runs the main crawl operation
///
/// This function orchestrates the entire run:
///
/// 1. Open the configured sink and start its writer task
/// 2. Build the HTTP transport and plan the listing tasks
/// 3. Crawl listings and match reports
/// 4. Wait for the writer to commit everything and close the sink
///
/// # Example
///
/// ```no_run
/// use sumula::config::load_config_with_hash;
/// use sumula::crawler::run_crawl;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("sumula.toml"))?;
/// let summary = run_crawl(config, &hash, CancellationToken::new()).await?;
/// println!("{} records stored", summary.sink.ingested);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    config_hash: &str,
    cancel: CancellationToken,
) -> Result<RunSummary> {
    let sink = open_sink(&config.storage, config_hash);
    let (tx, writer) = spawn_sink_writer(sink, config.storage.batch_size, SINK_CHANNEL_CAPACITY);

    let coordinator = match Coordinator::with_http(config, tx, cancel) {
        Ok(coordinator) => coordinator,
        Err(e) => {
            // The sender is gone, so the writer closes the sink on its own
            let _ = writer.await;
            return Err(e);
        }
    };

    let crawl = coordinator.run().await;
    let sink = writer
        .await
        .map_err(|e| HarvestError::Writer(e.to_string()))?;

    Ok(RunSummary { crawl, sink })
}
