//! News ingestion and query module.
//!
//! This module provides:
//! - Feed fetching and normalization
//! - One polling loop per configured source, merged by the aggregator
//! - The ingestion sink that persists fetched batches
//! - Recent, paged and search queries over stored items

pub mod aggregator;
pub mod fetcher;
pub mod pipeline;
pub mod poller;
pub mod query;
pub mod repository;
pub mod sink;
pub mod types;

pub use aggregator::{Aggregator, IngestStreams};
pub use fetcher::{FeedFetcher, HttpFeedFetcher};
pub use pipeline::{configure, IngestPipeline, IngestReport, PipelineOptions};
pub use poller::{BackoffPolicy, ExponentialBackoff, FixedInterval, Poller, PollerState};
pub use query::{Page, QueryEngine};
pub use repository::NewsRepository;
pub use sink::{IngestionSink, SinkStats};
pub use types::{IngestFailure, Item, ItemBatch, NewItem, Pagination, Source, PAGE_SIZE};
