//! Per-source polling loop.
//!
//! A poller repeats fetch, hand-off and sleep for one [`Source`] until it is
//! cancelled or nobody is listening downstream anymore.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::news::fetcher::FeedFetcher;
use crate::news::types::{IngestFailure, ItemBatch, Source};
use crate::shutdown::Shutdown;

/// Decides how long a poller sleeps after a cycle.
pub trait BackoffPolicy: Send + Sync {
    /// Delay before the next cycle, given the configured interval and the
    /// number of consecutive failed cycles (0 after a success).
    fn next_delay(&self, interval: Duration, consecutive_failures: u32) -> Duration;
}

/// Always waits the configured interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedInterval;

impl BackoffPolicy for FixedInterval {
    fn next_delay(&self, interval: Duration, _consecutive_failures: u32) -> Duration {
        interval
    }
}

/// Doubles the interval per consecutive failure, capped at `max`.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    pub max: Duration,
}

impl ExponentialBackoff {
    pub fn new(max: Duration) -> Self {
        Self { max }
    }
}

impl BackoffPolicy for ExponentialBackoff {
    fn next_delay(&self, interval: Duration, consecutive_failures: u32) -> Duration {
        let factor = 1u32.checked_shl(consecutive_failures.min(31)).unwrap_or(u32::MAX);
        // Never shorter than the configured interval
        interval
            .checked_mul(factor)
            .unwrap_or(self.max)
            .min(self.max)
            .max(interval)
    }
}

/// Lifecycle state of a poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Fetching,
    Succeeded,
    Failed,
    Sleeping,
    Stopped,
}

/// Polls one source and forwards results to the aggregator channels.
pub struct Poller {
    source: Source,
    fetcher: Arc<dyn FeedFetcher>,
    backoff: Arc<dyn BackoffPolicy>,
    items: mpsc::Sender<ItemBatch>,
    errors: mpsc::Sender<IngestFailure>,
    shutdown: Shutdown,
    state: PollerState,
    consecutive_failures: u32,
}

impl Poller {
    pub fn new(
        source: Source,
        fetcher: Arc<dyn FeedFetcher>,
        backoff: Arc<dyn BackoffPolicy>,
        items: mpsc::Sender<ItemBatch>,
        errors: mpsc::Sender<IngestFailure>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            source,
            fetcher,
            backoff,
            items,
            errors,
            shutdown,
            state: PollerState::Idle,
            consecutive_failures: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Run the polling loop until cancelled.
    ///
    /// Returns the number of completed cycles.
    pub async fn run(mut self) -> u64 {
        info!(
            "Poller started for {} (interval: {} seconds)",
            self.source.url,
            self.source.interval.as_secs()
        );

        let mut cycles = 0;
        while self.cycle().await {
            cycles += 1;
            if !self.sleep().await {
                break;
            }
        }

        self.state = PollerState::Stopped;
        info!("Poller for {} stopped after {} cycle(s)", self.source.url, cycles);
        cycles
    }

    /// Run one fetch and hand-off. Returns `false` when the poller must stop.
    async fn cycle(&mut self) -> bool {
        if self.shutdown.is_triggered() {
            return false;
        }

        self.state = PollerState::Fetching;
        debug!("Fetching {}", self.source.url);

        let mut shutdown = self.shutdown.clone();
        let result = tokio::select! {
            _ = shutdown.wait() => return false,
            result = self.fetcher.fetch(&self.source.url) => result,
        };

        let delivered = match result {
            Ok(items) => {
                self.state = PollerState::Succeeded;
                self.consecutive_failures = 0;
                debug!("Fetched {} item(s) from {}", items.len(), self.source.url);

                let batch = ItemBatch {
                    source: self.source.url.clone(),
                    items,
                };
                tokio::select! {
                    _ = shutdown.wait() => return false,
                    sent = self.items.send(batch) => sent.is_ok(),
                }
            }
            Err(error) => {
                self.state = PollerState::Failed;
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                warn!("Failed to fetch {}: {}", self.source.url, error);

                let failure = IngestFailure {
                    source: self.source.url.clone(),
                    error,
                };
                tokio::select! {
                    _ = shutdown.wait() => return false,
                    sent = self.errors.send(failure) => sent.is_ok(),
                }
            }
        };

        if !delivered {
            debug!("Downstream closed, stopping poller for {}", self.source.url);
        }
        delivered
    }

    /// Sleep until the next cycle. Returns `false` when cancelled meanwhile.
    async fn sleep(&mut self) -> bool {
        self.state = PollerState::Sleeping;
        let delay = self
            .backoff
            .next_delay(self.source.interval, self.consecutive_failures);

        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            _ = shutdown.wait() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}
