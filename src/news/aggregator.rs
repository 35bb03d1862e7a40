//! Fan-in of every poller into one item stream and one error stream.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::news::fetcher::FeedFetcher;
use crate::news::poller::{BackoffPolicy, Poller};
use crate::news::types::{IngestFailure, ItemBatch, Source};
use crate::shutdown::Shutdown;

/// Receiving ends of the merged streams plus the spawned pollers.
///
/// Both streams close once every poller has stopped and every other sender
/// clone has been dropped.
pub struct IngestStreams {
    pub items: mpsc::Receiver<ItemBatch>,
    pub errors: mpsc::Receiver<IngestFailure>,
    /// Extra sender for the error stream, used by the sink.
    pub error_sender: mpsc::Sender<IngestFailure>,
    pub pollers: Vec<JoinHandle<u64>>,
}

/// Spawns one poller per source over shared bounded channels.
///
/// Pollers block on a full channel; nothing is dropped. Ordering holds per
/// poller only.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    capacity: usize,
}

impl Aggregator {
    /// Create an aggregator whose channels hold `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }

    /// Start a poller task for every source.
    pub fn start(
        &self,
        sources: Vec<Source>,
        fetcher: Arc<dyn FeedFetcher>,
        backoff: Arc<dyn BackoffPolicy>,
        shutdown: Shutdown,
    ) -> IngestStreams {
        let (items_tx, items_rx) = mpsc::channel(self.capacity);
        let (errors_tx, errors_rx) = mpsc::channel(self.capacity);

        info!("Starting {} poller(s)", sources.len());

        let pollers = sources
            .into_iter()
            .map(|source| {
                let poller = Poller::new(
                    source,
                    Arc::clone(&fetcher),
                    Arc::clone(&backoff),
                    items_tx.clone(),
                    errors_tx.clone(),
                    shutdown.clone(),
                );
                tokio::spawn(poller.run())
            })
            .collect();

        IngestStreams {
            items: items_rx,
            errors: errors_rx,
            error_sender: errors_tx,
            pollers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::poller::FixedInterval;
    use crate::news::types::NewItem;
    use crate::shutdown;
    use crate::{NewsError, Result};
    use async_trait::async_trait;
    use std::time::Duration;

    struct EchoFetcher;

    #[async_trait]
    impl FeedFetcher for EchoFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<NewItem>> {
            if url.contains("bad") {
                return Err(NewsError::Fetch("unreachable".to_string()));
            }
            Ok(vec![NewItem::new(url, url)])
        }
    }

    #[tokio::test]
    async fn test_fan_in_from_every_source() {
        let (trigger, shutdown) = shutdown::channel();
        let sources = vec![
            Source::with_interval("https://a.example/rss", Duration::from_secs(3600)),
            Source::with_interval("https://b.example/rss", Duration::from_secs(3600)),
            Source::with_interval("https://bad.example/rss", Duration::from_secs(3600)),
        ];

        let mut streams = Aggregator::new(2).start(
            sources,
            Arc::new(EchoFetcher),
            Arc::new(FixedInterval),
            shutdown,
        );
        assert_eq!(streams.pollers.len(), 3);

        let mut seen = vec![
            streams.items.recv().await.unwrap().source,
            streams.items.recv().await.unwrap().source,
        ];
        seen.sort();
        assert_eq!(seen, vec!["https://a.example/rss", "https://b.example/rss"]);

        let failure = streams.errors.recv().await.unwrap();
        assert_eq!(failure.source, "https://bad.example/rss");

        trigger.trigger();
        for handle in streams.pollers.drain(..) {
            assert_eq!(handle.await.unwrap(), 1);
        }

        // Item stream closes once every poller is gone
        assert!(streams.items.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_no_sources() {
        let (_trigger, shutdown) = shutdown::channel();
        let mut streams = Aggregator::new(4).start(
            vec![],
            Arc::new(EchoFetcher),
            Arc::new(FixedInterval),
            shutdown,
        );
        assert!(streams.pollers.is_empty());
        assert!(streams.items.recv().await.is_none());
    }
}
