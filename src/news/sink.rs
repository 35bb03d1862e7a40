//! Ingestion sink: the single writer of news items.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::repository::NewsRepository;
use super::types::{IngestFailure, ItemBatch, NewItem};
use crate::db::DbPool;
use crate::{NewsError, Result};

/// Source name used for failures raised by the sink itself.
pub const SINK_SOURCE: &str = "sink";

/// Counters reported when the sink stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub batches: u64,
    pub items_written: u64,
    pub failures: u64,
}

/// Persists item batches, one at a time.
pub struct IngestionSink {
    pool: DbPool,
    unique_links: bool,
}

impl IngestionSink {
    /// Create a sink. With `unique_links` duplicate links are skipped, which
    /// requires the unique link index.
    pub fn new(pool: DbPool, unique_links: bool) -> Self {
        Self { pool, unique_links }
    }

    /// Store a batch and return the number of rows written.
    ///
    /// Items are inserted one by one without a surrounding transaction.
    /// The first failing insert aborts the batch; earlier inserts stay
    /// committed and the error says how many.
    pub async fn store(&self, items: &[NewItem]) -> Result<usize> {
        let repo = NewsRepository::new(&self.pool);
        let mut written = 0;

        for item in items {
            let outcome = if self.unique_links {
                repo.insert_or_ignore(item).await.map(|id| id.is_some())
            } else {
                repo.insert(item).await.map(|_| true)
            };

            match outcome {
                Ok(true) => written += 1,
                Ok(false) => debug!("Skipped duplicate link {}", item.link),
                Err(e) => {
                    return Err(NewsError::Persistence(format!(
                        "{} (after {} of {} items committed)",
                        e,
                        written,
                        items.len()
                    )));
                }
            }
        }

        Ok(written)
    }

    /// Consume the item stream until every producer is gone.
    ///
    /// Persistence failures are forwarded to `errors` and never stop the
    /// loop.
    pub async fn run(
        self,
        mut items: mpsc::Receiver<ItemBatch>,
        errors: mpsc::Sender<IngestFailure>,
    ) -> SinkStats {
        info!("Ingestion sink started");
        let mut stats = SinkStats::default();

        while let Some(batch) = items.recv().await {
            stats.batches += 1;
            match self.store(&batch.items).await {
                Ok(count) => {
                    stats.items_written += count as u64;
                    info!("Stored {} new item(s) from {}", count, batch.source);
                }
                Err(e) => {
                    stats.failures += 1;
                    debug!("Batch from {} not fully stored", batch.source);
                    let failure = IngestFailure {
                        source: SINK_SOURCE.to_string(),
                        error: e,
                    };
                    if let Err(unsent) = errors.send(failure).await {
                        // Logger already gone
                        error!("{}", unsent.0);
                    }
                }
            }
        }

        info!(
            "Ingestion sink stopped: {} batch(es), {} item(s) written, {} failure(s)",
            stats.batches, stats.items_written, stats.failures
        );
        stats
    }
}

/// Log every failure on the error stream until it closes.
///
/// Returns the number of failures seen.
pub async fn run_error_logger(mut errors: mpsc::Receiver<IngestFailure>) -> u64 {
    let mut count = 0;
    while let Some(failure) = errors.recv().await {
        count += 1;
        match failure.error {
            NewsError::Fetch(_) => warn!("Ingest failure from {}", failure),
            _ => error!("Ingest failure from {}", failure),
        }
    }
    debug!("Error logger stopped after {} failure(s)", count);
    count
}
