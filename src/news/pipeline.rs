//! Ingestion pipeline bootstrap.
//!
//! [`configure`] wires pollers, aggregator, sink and error logger together
//! and hands back an [`IngestPipeline`] that owns them until shutdown.

use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::aggregator::Aggregator;
use super::fetcher::FeedFetcher;
use super::poller::{BackoffPolicy, ExponentialBackoff, FixedInterval};
use super::sink::{run_error_logger, IngestionSink, SinkStats};
use super::types::Source;
use crate::config::{BackoffKind, Config};
use crate::db::DbPool;
use crate::shutdown::{self, ShutdownTrigger};
use crate::{NewsError, Result};

/// Tunables for [`configure`].
#[derive(Clone)]
pub struct PipelineOptions {
    pub channel_capacity: usize,
    pub backoff: Arc<dyn BackoffPolicy>,
    pub unique_links: bool,
}

impl PipelineOptions {
    /// Build options from the application configuration.
    pub fn from_config(config: &Config) -> Self {
        let backoff: Arc<dyn BackoffPolicy> = match config.ingest.backoff {
            BackoffKind::Fixed => Arc::new(FixedInterval),
            BackoffKind::Exponential => {
                Arc::new(ExponentialBackoff::new(config.ingest.max_backoff()))
            }
        };

        Self {
            channel_capacity: config.ingest.channel_capacity,
            backoff,
            unique_links: config.database.unique_links,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
            backoff: Arc::new(FixedInterval),
            unique_links: false,
        }
    }
}

/// Summary returned by [`IngestPipeline::shutdown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Poll cycles completed across every poller.
    pub cycles: u64,
    pub sink: SinkStats,
    /// Failures seen by the error logger.
    pub failures_logged: u64,
}

/// Running ingestion tasks.
pub struct IngestPipeline {
    trigger: ShutdownTrigger,
    pollers: Vec<JoinHandle<u64>>,
    sink: JoinHandle<SinkStats>,
    logger: JoinHandle<u64>,
}

impl IngestPipeline {
    /// Number of running pollers.
    pub fn poller_count(&self) -> usize {
        self.pollers.len()
    }

    /// Stop every poller, then let the sink and error logger drain.
    pub async fn shutdown(self) -> IngestReport {
        info!("Stopping ingestion pipeline");
        self.trigger.trigger();

        let mut report = IngestReport::default();

        for result in join_all(self.pollers).await {
            match result {
                Ok(cycles) => report.cycles += cycles,
                Err(e) => error!("Poller task failed: {}", e),
            }
        }

        // Both streams close once the pollers are gone
        match self.sink.await {
            Ok(stats) => report.sink = stats,
            Err(e) => error!("Sink task failed: {}", e),
        }
        match self.logger.await {
            Ok(count) => report.failures_logged = count,
            Err(e) => error!("Error logger task failed: {}", e),
        }

        info!(
            "Ingestion pipeline stopped: {} cycle(s), {} item(s) written",
            report.cycles, report.sink.items_written
        );
        report
    }
}

/// Start one poller per source, the sink and the error logger.
///
/// This is the only place the source set is decided; it cannot change while
/// the pipeline runs. Must be called from within a Tokio runtime.
pub fn configure(
    sources: Vec<Source>,
    pool: DbPool,
    fetcher: Arc<dyn FeedFetcher>,
    options: PipelineOptions,
) -> Result<IngestPipeline> {
    if options.channel_capacity == 0 {
        return Err(NewsError::invalid("channel capacity must be positive"));
    }
    if let Some(source) = sources.iter().find(|s| s.interval.is_zero()) {
        return Err(NewsError::invalid(format!(
            "source {} has a zero poll interval",
            source.url
        )));
    }

    let (trigger, shutdown) = shutdown::channel();
    let streams = Aggregator::new(options.channel_capacity).start(
        sources,
        fetcher,
        options.backoff,
        shutdown,
    );

    let sink = IngestionSink::new(pool, options.unique_links);
    let sink = tokio::spawn(sink.run(streams.items, streams.error_sender));
    let logger = tokio::spawn(run_error_logger(streams.errors));

    info!("Ingestion pipeline started with {} source(s)", streams.pollers.len());

    Ok(IngestPipeline {
        trigger,
        pollers: streams.pollers,
        sink,
        logger,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.ingest.channel_capacity = 3;
        config.database.unique_links = true;

        let options = PipelineOptions::from_config(&config);
        assert_eq!(options.channel_capacity, 3);
        assert!(options.unique_links);

        let interval = std::time::Duration::from_secs(60);
        assert_eq!(options.backoff.next_delay(interval, 4), interval);

        config.ingest.backoff = BackoffKind::Exponential;
        let options = PipelineOptions::from_config(&config);
        assert_eq!(options.backoff.next_delay(interval, 1), interval * 2);
    }
}
