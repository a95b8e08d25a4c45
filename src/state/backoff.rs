use crate::config::BackoffConfig;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Consecutive block signals observed by the current run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackoffState {
    pub consecutive_block_count: u32,
}

impl BackoffState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a block signal and returns the new count
    pub fn record_block(&mut self) -> u32 {
        self.consecutive_block_count = self.consecutive_block_count.saturating_add(1);
        self.consecutive_block_count
    }

    /// Clears the counter, returning the count it held
    pub fn reset(&mut self) -> u32 {
        std::mem::take(&mut self.consecutive_block_count)
    }
}

#[derive(Debug)]
struct Inner {
    state: BackoffState,
    paused_until: Option<Instant>,
    total_blocks: u64,
}

/// Process-wide circuit breaker for block signals
///
/// Every response passes through `record_block` or `record_response`. A block
/// pauses issuance for `min(cap, base_interval * consecutive_blocks)`; callers
/// gate each new request on `wait_ready`, so one block stalls every worker.
/// All counter updates happen under a single mutex.
#[derive(Debug)]
pub struct BackoffController {
    base_interval: Duration,
    cap: Duration,
    inner: Mutex<Inner>,
}

impl BackoffController {
    pub fn new(base_interval: Duration, cap: Duration) -> Self {
        Self {
            base_interval,
            cap,
            inner: Mutex::new(Inner {
                state: BackoffState::new(),
                paused_until: None,
                total_blocks: 0,
            }),
        }
    }

    /// Builds a controller from config values given in seconds
    pub fn from_config(config: &BackoffConfig) -> Self {
        Self::new(
            Duration::from_secs(config.base_interval),
            Duration::from_secs(config.cap),
        )
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Pause length for the given consecutive block count
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use sumula::state::BackoffController;
    ///
    /// let backoff = BackoffController::new(Duration::from_secs(360), Duration::from_secs(420));
    /// assert_eq!(backoff.pause_for(1), Duration::from_secs(360));
    /// assert_eq!(backoff.pause_for(2), Duration::from_secs(420));
    /// ```
    pub fn pause_for(&self, consecutive_blocks: u32) -> Duration {
        self.base_interval
            .saturating_mul(consecutive_blocks)
            .min(self.cap)
    }

    /// Registers a block signal and extends the global pause
    ///
    /// Returns the pause that this signal imposed.
    pub fn record_block(&self, url: &str) -> Duration {
        let mut inner = self.lock();
        let attempt = inner.state.record_block();
        inner.total_blocks += 1;

        let pause = self.pause_for(attempt);
        let until = Instant::now() + pause;
        inner.paused_until = Some(match inner.paused_until {
            Some(existing) if existing > until => existing,
            _ => until,
        });

        tracing::warn!(
            "Block signal received for {}; pausing all requests for {}s (attempt {})",
            url,
            pause.as_secs(),
            attempt
        );

        pause
    }

    /// Registers a normal response, resetting the counter
    ///
    /// Returns true when this response ended a streak of blocks.
    pub fn record_response(&self) -> bool {
        let mut inner = self.lock();
        let previous = inner.state.reset();
        if previous > 0 {
            tracing::info!(
                "Responses back to normal after {} consecutive block(s); counter reset",
                previous
            );
            true
        } else {
            false
        }
    }

    /// Waits until no pause is in effect
    ///
    /// Returns false if the run was cancelled while waiting.
    pub async fn wait_ready(&self, cancel: &CancellationToken) -> bool {
        loop {
            if cancel.is_cancelled() {
                return false;
            }

            let deadline = match self.lock().paused_until {
                Some(until) if until > Instant::now() => until,
                _ => return true,
            };

            tracing::debug!(
                "Backoff in effect, waiting {:?}",
                deadline.saturating_duration_since(Instant::now())
            );

            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {}
                _ = cancel.cancelled() => return false,
            }
        }
    }

    /// Whether a pause is currently in effect
    pub fn is_paused(&self) -> bool {
        matches!(self.lock().paused_until, Some(until) if until > Instant::now())
    }

    pub fn state(&self) -> BackoffState {
        self.lock().state
    }

    /// Block signals seen over the whole run
    pub fn total_blocks(&self) -> u64 {
        self.lock().total_blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn create_test_controller() -> BackoffController {
        BackoffController::new(Duration::from_secs(360), Duration::from_secs(420))
    }

    #[test]
    fn test_backoff_state_counts_and_resets() {
        let mut state = BackoffState::new();
        assert_eq!(state.record_block(), 1);
        assert_eq!(state.record_block(), 2);
        assert_eq!(state.reset(), 2);
        assert_eq!(state.consecutive_block_count, 0);
    }

    #[test]
    fn test_pause_sequence_is_capped() {
        let backoff = create_test_controller();
        let pauses: Vec<u64> = (1..=3).map(|n| backoff.pause_for(n).as_secs()).collect();
        assert_eq!(pauses, vec![360, 420, 420]);
    }

    #[test]
    fn test_pause_below_cap_grows_linearly() {
        let backoff = BackoffController::new(Duration::from_secs(10), Duration::from_secs(100));
        assert_eq!(backoff.pause_for(0), Duration::ZERO);
        assert_eq!(backoff.pause_for(3), Duration::from_secs(30));
        assert_eq!(backoff.pause_for(50), Duration::from_secs(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_block_returns_progressive_pauses() {
        let backoff = create_test_controller();
        assert_eq!(backoff.record_block("a").as_secs(), 360);
        assert_eq!(backoff.record_block("b").as_secs(), 420);
        assert_eq!(backoff.record_block("c").as_secs(), 420);
        assert_eq!(backoff.state().consecutive_block_count, 3);
        assert_eq!(backoff.total_blocks(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_response_resets_counter() {
        let backoff = create_test_controller();
        for _ in 0..5 {
            backoff.record_block("https://www.ogol.com.br/");
        }

        assert!(backoff.record_response());
        assert_eq!(backoff.state().consecutive_block_count, 0);
        // Total is kept for reporting
        assert_eq!(backoff.total_blocks(), 5);
        assert!(!backoff.record_response());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_ready_without_pause_returns_immediately() {
        let backoff = create_test_controller();
        let cancel = CancellationToken::new();
        let start = Instant::now();
        assert!(backoff.wait_ready(&cancel).await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_ready_blocks_for_pause() {
        let backoff = create_test_controller();
        let cancel = CancellationToken::new();

        backoff.record_block("https://www.ogol.com.br/");
        assert!(backoff.is_paused());

        let start = Instant::now();
        assert!(backoff.wait_ready(&cancel).await);
        assert!(start.elapsed() >= Duration::from_secs(360));
        assert!(!backoff.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_is_global_across_waiters() {
        let backoff = Arc::new(create_test_controller());
        let cancel = CancellationToken::new();
        backoff.record_block("https://www.ogol.com.br/");

        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..3 {
            let backoff = backoff.clone();
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                backoff.wait_ready(&cancel).await;
                Instant::now()
            }));
        }

        for handle in handles {
            let resumed = handle.await.unwrap();
            assert!(resumed.duration_since(start) >= Duration::from_secs(360));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_block_does_not_shorten_pause() {
        let backoff = BackoffController::new(Duration::from_secs(100), Duration::from_secs(300));
        let cancel = CancellationToken::new();

        backoff.record_block("first");
        backoff.record_block("second");
        backoff.record_response();
        // Counter restarted, so this block only asks for 100s
        backoff.record_block("third");

        let start = Instant::now();
        backoff.wait_ready(&cancel).await;
        assert!(start.elapsed() >= Duration::from_secs(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_ready_observes_cancellation() {
        let backoff = create_test_controller();
        let cancel = CancellationToken::new();
        backoff.record_block("https://www.ogol.com.br/");

        let waiter = {
            let cancel = cancel.clone();
            async move { backoff.wait_ready(&cancel).await }
        };
        cancel.cancel();
        assert!(!waiter.await);
    }
}
