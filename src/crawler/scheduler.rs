//! Request admission: concurrency limit plus politeness pacing
//!
//! Every fetch acquires a permit before it is issued. Permits bound the number
//! of requests in flight; issuance slots are additionally spaced by the
//! configured minimum interval across the whole process.

use crate::config::CrawlerConfig;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Admission control shared by every worker
#[derive(Debug)]
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    /// Minimum spacing between two issuances
    spacing: Duration,

    /// Earliest instant the next request may be issued
    next_slot: Mutex<Option<Instant>>,
}

impl Scheduler {
    pub fn new(max_concurrent: usize, spacing: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            spacing,
            next_slot: Mutex::new(None),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.max_concurrent_requests as usize,
            Duration::from_millis(config.minimum_time_between_requests),
        )
    }

    /// Waits for a concurrency permit and an issuance slot
    ///
    /// The permit must be held until the response has been received.
    /// Returns `None` only if the semaphore was closed.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await.ok()?;

        let slot = self.reserve_slot();
        if slot > Instant::now() {
            tokio::time::sleep_until(slot).await;
        }

        Some(permit)
    }

    /// Claims the next issuance slot and pushes the following one back
    fn reserve_slot(&self) -> Instant {
        let mut next = self
            .next_slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Instant::now();
        let slot = match *next {
            Some(at) if at > now => at,
            _ => now,
        };
        *next = Some(slot + self.spacing);
        slot
    }

    /// Permits currently free
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}
